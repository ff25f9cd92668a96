use glam::Vec3;

use crate::collision::CollisionWorld;
use crate::config::WorldConfig;

/// Movement intent captured once at the start of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Intent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    /// Positive turns clockwise seen from above.
    pub look_delta: f32,
}

#[derive(Debug, Clone)]
pub struct Observer {
    position: Vec3,
    yaw: f32,
    velocity: Vec3,
    radius: f32,
    speed: f32,
    smoothing: f32,
    sensitivity: f32,
}

impl Observer {
    pub fn new(position: Vec3, config: &WorldConfig) -> Self {
        Self {
            position,
            yaw: 0.0,
            velocity: Vec3::ZERO,
            radius: config.observer_radius,
            speed: config.move_speed,
            smoothing: config.move_smoothing,
            sensitivity: config.look_sensitivity,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Teleports and stops the observer.
    pub fn place(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
    }

    /// Yaw 0 faces north (-z).
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or_zero()
    }

    /// Turns, eases velocity toward the intent and returns the proposed
    /// position. Nothing is committed.
    pub fn propose(&mut self, intent: &Intent) -> Vec3 {
        let turned = self.yaw + intent.look_delta * self.sensitivity;
        self.yaw = turned.rem_euclid(std::f32::consts::TAU);

        let mut wish = Vec3::ZERO;
        if intent.forward {
            wish += self.forward();
        }
        if intent.back {
            wish -= self.forward();
        }
        if intent.right {
            wish += self.right();
        }
        if intent.left {
            wish -= self.right();
        }
        let target = wish.normalize_or_zero() * self.speed;
        self.velocity = self.velocity.lerp(target, self.smoothing);
        self.position + self.velocity
    }

    /// Applies `intent` and commits the move if `collision` allows it.
    /// Returns whether the position changed.
    pub fn advance(&mut self, intent: &Intent, collision: &CollisionWorld) -> bool {
        let proposed = self.propose(intent);
        if proposed == self.position {
            return false;
        }
        if collision.can_move(self.position, proposed, self.radius) {
            self.position = proposed;
            true
        } else {
            false
        }
    }
}
