use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DifficultyLevel {
    VeryEasy,
    Easy,
    #[default]
    Normal,
    Hard,
    Nightmare,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 5] = [
        DifficultyLevel::VeryEasy,
        DifficultyLevel::Easy,
        DifficultyLevel::Normal,
        DifficultyLevel::Hard,
        DifficultyLevel::Nightmare,
    ];

    pub fn profile(self) -> DifficultyProfile {
        match self {
            DifficultyLevel::VeryEasy => DifficultyProfile::new(0.01, 1.5, 40.0),
            DifficultyLevel::Easy => DifficultyProfile::new(0.02, 1.3, 35.0),
            DifficultyLevel::Normal => DifficultyProfile::new(0.04, 1.0, 30.0),
            DifficultyLevel::Hard => DifficultyProfile::new(0.06, 0.8, 25.0),
            DifficultyLevel::Nightmare => DifficultyProfile::new(0.08, 0.6, 20.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLevel::VeryEasy => "veryEasy",
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Normal => "normal",
            DifficultyLevel::Hard => "hard",
            DifficultyLevel::Nightmare => "nightmare",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty level `{0}`")]
pub struct UnknownDifficulty(pub String);

impl FromStr for DifficultyLevel {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DifficultyLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

/// Pursuit tuning fixed for the length of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub agent_speed: f32,
    pub capture_distance: f32,
    pub spawn_distance: f32,
}

impl DifficultyProfile {
    pub const fn new(agent_speed: f32, capture_distance: f32, spawn_distance: f32) -> Self {
        Self {
            agent_speed,
            capture_distance,
            spawn_distance,
        }
    }
}
