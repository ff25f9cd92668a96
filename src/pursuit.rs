use glam::Vec3;

use crate::difficulty::DifficultyProfile;

/// Outcome of one [`PursuitAgent::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PursuitUpdate {
    pub position: Vec3,
    pub distance: f32,
    /// True only on the tick the agent first closes within capture distance.
    pub captured: bool,
}

/// The stalker. Seeks the observer in a straight line, ignoring walls.
#[derive(Debug, Clone)]
pub struct PursuitAgent {
    position: Vec3,
    profile: DifficultyProfile,
    caught: bool,
}

impl PursuitAgent {
    pub fn new(position: Vec3, profile: DifficultyProfile) -> Self {
        Self {
            position,
            profile,
            caught: false,
        }
    }

    /// Places the agent `spawn_distance` away from `observer` along the
    /// horizontal diagonal, at the observer's height.
    pub fn spawn(observer: Vec3, profile: DifficultyProfile) -> Self {
        let diagonal = Vec3::new(1.0, 0.0, 1.0).normalize();
        Self::new(observer + diagonal * profile.spawn_distance, profile)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.profile
    }

    pub fn has_captured(&self) -> bool {
        self.caught
    }

    /// Moves the agent and clears the capture latch.
    pub fn reset(&mut self, position: Vec3) {
        self.position = position;
        self.caught = false;
    }

    pub fn update(&mut self, observer: Vec3) -> PursuitUpdate {
        let offset = observer - self.position;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return self.report(0.0);
        }

        self.position += offset / distance * self.profile.agent_speed;
        let distance = self.position.distance(observer);
        self.report(distance)
    }

    fn report(&mut self, distance: f32) -> PursuitUpdate {
        let close = distance < self.profile.capture_distance || distance <= f32::EPSILON;
        let captured = close && !self.caught;
        if captured {
            self.caught = true;
            log::info!("agent reached observer at distance {distance:.2}");
        }
        PursuitUpdate {
            position: self.position,
            distance,
            captured,
        }
    }
}

/// Presentation overlays derived from agent distance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tension {
    /// Builds from 50 units away.
    pub eeriness: f32,
    /// Builds from 25 units away.
    pub fear: f32,
}

impl Tension {
    pub fn from_distance(distance: f32) -> Self {
        Self {
            eeriness: (100.0 - distance * 2.0).clamp(0.0, 100.0),
            fear: (100.0 - distance * 4.0).clamp(0.0, 100.0),
        }
    }
}
