//! Saved game file
//!
//! A saved game is one JSON object:
//!
//! ```json
//! {"fen": "...", "whiteClock": 12.5, "blackClock": 9.0, "bot": true, "moves": ["e2e4", "e7e5"]}
//! ```
//!
//! Loading a path that does not exist is not an error; it yields `None` so the
//! caller can leave the session untouched.

use crate::game::error::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

/// Snapshot of a session: the unit of save and load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedGameState {
    pub fen: String,
    /// White's elapsed seconds
    pub white_clock: f64,
    /// Black's elapsed seconds
    pub black_clock: f64,
    /// Engine auto-play was on
    pub bot: bool,
    pub moves: Vec<String>,
}

impl PersistedGameState {
    /// Write the snapshot as pretty JSON, creating parent directories
    pub fn write_to(&self, path: &Path) -> GameResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| GameError::MalformedSave {
            reason: e.to_string(),
        })?;
        fs::write(path, json)?;
        info!("[SAVE] Saved game to {:?}", path);
        Ok(())
    }

    /// Read a snapshot; `Ok(None)` when the file does not exist
    pub fn read_from(path: &Path) -> GameResult<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("[SAVE] No saved game at {:?}", path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let state = serde_json::from_str(&contents).map_err(|e| GameError::MalformedSave {
            reason: e.to_string(),
        })?;
        Ok(Some(state))
    }
}
