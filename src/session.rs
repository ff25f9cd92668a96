use std::fmt;

use glam::Vec3;

use crate::collision::CollisionWorld;
use crate::config::WorldConfig;
use crate::difficulty::{DifficultyLevel, DifficultyProfile};
use crate::observer::{Intent, Observer};
use crate::pursuit::{PursuitAgent, Tension};
use crate::save::SaveRecord;
use crate::streaming::{ChunkStreamer, StreamDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Active,
    Paused,
    GameOver,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Active => "active",
            SessionState::Paused => "paused",
            SessionState::GameOver => "game over",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: SessionState,
        action: &'static str,
    },
}

/// Everything the presentation side needs after one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub observer: Vec3,
    pub agent: Vec3,
    pub distance: f32,
    pub tension: Tension,
    pub captured: bool,
    pub moved: bool,
    pub streamed: Option<StreamDelta>,
    pub near_save_point: bool,
}

/// One playthrough: the world around the observer and the agent chasing it.
pub struct Session {
    config: WorldConfig,
    state: SessionState,
    difficulty: DifficultyLevel,
    observer: Observer,
    agent: PursuitAgent,
    streamer: ChunkStreamer,
    collision: CollisionWorld,
    tension: Tension,
    frame: u64,
}

impl Session {
    pub fn new(config: WorldConfig) -> Self {
        let difficulty = DifficultyLevel::default();
        let start = spawn_point(&config);
        let observer = Observer::new(start, &config);
        let agent = PursuitAgent::spawn(start, difficulty.profile());
        let streamer = ChunkStreamer::new(&config);
        let collision = CollisionWorld::new(config.chunk_world_size());
        Self {
            config,
            state: SessionState::Idle,
            difficulty,
            observer,
            agent,
            streamer,
            collision,
            tension: Tension::default(),
            frame: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.agent.profile()
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    pub fn agent(&self) -> &PursuitAgent {
        &self.agent
    }

    pub fn streamer(&self) -> &ChunkStreamer {
        &self.streamer
    }

    pub fn collision(&self) -> &CollisionWorld {
        &self.collision
    }

    pub fn tension(&self) -> Tension {
        self.tension
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Idle -> Loading. Resets the observer and spawns the agent for `level`.
    pub fn select_difficulty(&mut self, level: DifficultyLevel) -> Result<(), SessionError> {
        self.expect(SessionState::Idle, "select a difficulty")?;
        self.difficulty = level;
        let start = spawn_point(&self.config);
        self.observer.place(start);
        self.agent = PursuitAgent::spawn(start, level.profile());
        self.tension = Tension::default();
        self.frame = 0;
        self.transition(SessionState::Loading);
        Ok(())
    }

    /// Loading -> Active. Streams the starting area in before the first tick.
    pub fn finish_loading(&mut self) -> Result<StreamDelta, SessionError> {
        self.expect(SessionState::Loading, "finish loading")?;
        let delta = self.streamer.tick(self.observer.position(), &mut self.collision);
        self.transition(SessionState::Active);
        Ok(delta)
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.expect(SessionState::Active, "pause")?;
        self.transition(SessionState::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.expect(SessionState::Paused, "resume")?;
        self.transition(SessionState::Active);
        Ok(())
    }

    /// GameOver -> Idle. Tears the world down; the next session regenerates it.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.expect(SessionState::GameOver, "reset")?;
        self.streamer.clear(&mut self.collision);
        let start = spawn_point(&self.config);
        self.observer.place(start);
        self.agent = PursuitAgent::spawn(start, self.difficulty.profile());
        self.tension = Tension::default();
        self.transition(SessionState::Idle);
        Ok(())
    }

    /// Runs one frame. Outside the Active state nothing moves and `None` is
    /// returned.
    pub fn tick(&mut self, intent: &Intent) -> Option<TickReport> {
        if self.state != SessionState::Active {
            return None;
        }
        self.frame += 1;

        let moved = self.observer.advance(intent, &self.collision);
        let position = self.observer.position();

        let streamed = if self.frame % u64::from(self.config.stream_every.max(1)) == 0 {
            Some(self.streamer.tick(position, &mut self.collision))
        } else {
            None
        };

        let pursuit = self.agent.update(position);
        self.tension = Tension::from_distance(pursuit.distance);
        if pursuit.captured {
            self.transition(SessionState::GameOver);
        }

        Some(TickReport {
            observer: position,
            agent: pursuit.position,
            distance: pursuit.distance,
            tension: self.tension,
            captured: pursuit.captured,
            moved,
            streamed,
            near_save_point: self.near_save_point(),
        })
    }

    pub fn near_save_point(&self) -> bool {
        let position = self.observer.position();
        let reach = self.config.save_point_reach;
        self.streamer
            .chunks()
            .flat_map(|chunk| chunk.save_points())
            .any(|p| {
                let dx = p.x - position.x;
                let dz = p.z - position.z;
                dx.hypot(dz) < reach
            })
    }

    pub fn save_record(&self) -> SaveRecord {
        SaveRecord {
            observer_position: self.observer.position().to_array(),
            agent_position: self.agent.position().to_array(),
            difficulty: self.difficulty,
            eeriness: self.tension.eeriness,
            fear: self.tension.fear,
        }
    }

    /// Applies a saved record while Active or Paused. The world re-streams
    /// around the restored position on the next streaming frame.
    pub fn restore(&mut self, record: &SaveRecord) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Active | SessionState::Paused) {
            return Err(SessionError::InvalidTransition {
                state: self.state,
                action: "restore a save",
            });
        }
        self.difficulty = record.difficulty;
        self.observer.place(Vec3::from_array(record.observer_position));
        self.agent = PursuitAgent::new(
            Vec3::from_array(record.agent_position),
            record.difficulty.profile(),
        );
        self.tension = Tension {
            eeriness: record.eeriness.clamp(0.0, 100.0),
            fear: record.fear.clamp(0.0, 100.0),
        };
        log::info!("restored {} session at {}", self.difficulty, self.observer.position());
        Ok(())
    }

    fn expect(&self, state: SessionState, action: &'static str) -> Result<(), SessionError> {
        if self.state == state {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    fn transition(&mut self, next: SessionState) {
        log::info!("session {} -> {}", self.state, next);
        self.state = next;
    }
}

fn spawn_point(config: &WorldConfig) -> Vec3 {
    // Centre of cell (0, 0) of chunk (0, 0).
    let half = config.cell_size * 0.5;
    Vec3::new(half, config.eye_height, half)
}
