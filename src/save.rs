use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::difficulty::DifficultyLevel;

pub const SLOT_COUNT: u8 = 3;

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save slot {0} does not exist (slots are 1..=3)")]
    InvalidSlot(u8),
    #[error("save file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("save file {} is malformed: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What a save slot remembers about a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub observer_position: [f32; 3],
    pub agent_position: [f32; 3],
    pub difficulty: DifficultyLevel,
    pub eeriness: f32,
    pub fear: f32,
}

/// One JSON file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, slot: u8) -> Result<PathBuf, SaveError> {
        if slot == 0 || slot > SLOT_COUNT {
            return Err(SaveError::InvalidSlot(slot));
        }
        Ok(self.dir.join(format!("save_slot_{slot}.json")))
    }

    pub fn save(&self, slot: u8, record: &SaveRecord) -> Result<(), SaveError> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.dir).map_err(|source| SaveError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let json = serde_json::to_string_pretty(record).map_err(|source| SaveError::Format {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| SaveError::Io {
            path: path.clone(),
            source,
        })?;
        log::info!("saved slot {slot} to {}", path.display());
        Ok(())
    }

    /// `Ok(None)` when the slot has never been written.
    pub fn load(&self, slot: u8) -> Result<Option<SaveRecord>, SaveError> {
        let path = self.slot_path(slot)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SaveError::Io { path, source }),
        };
        let record = serde_json::from_str(&text).map_err(|source| SaveError::Format {
            path: path.clone(),
            source,
        })?;
        log::info!("loaded slot {slot} from {}", path.display());
        Ok(Some(record))
    }

    pub fn occupied(&self) -> Vec<u8> {
        (1..=SLOT_COUNT)
            .filter(|slot| self.slot_path(*slot).map(|p| p.is_file()).unwrap_or(false))
            .collect()
    }
}
