//! Session settings
//!
//! Everything a session needs that is not chosen per game: where the engine
//! lives, how long it may think, and where game files go. Stored as JSON by
//! [`crate::core::settings_persistence`]; every field has a default so partial
//! files load.

use crate::core::error::{CoreError, CoreResult};
use crate::game::ai::AIDifficulty;
use fenboard_uci::EngineOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Time-control presets offered by the launcher, in seconds
pub const TIME_PRESETS: [(&str, f64); 4] =
    [("1m", 60.0), ("3m", 180.0), ("10m", 600.0), ("1h", 3600.0)];

/// Limit in seconds for a preset label such as `"3m"`
pub fn time_preset(label: &str) -> Option<f64> {
    TIME_PRESETS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, seconds)| *seconds)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Engine executable; `None` disables engine features
    pub engine_path: Option<String>,
    pub difficulty: AIDifficulty,
    /// Budget for each analyzer evaluation, in milliseconds
    pub analysis_budget_ms: u64,
    /// Bound on each UCI handshake step, in milliseconds
    pub handshake_timeout_ms: u64,
    pub save_path: PathBuf,
    pub pgn_path: PathBuf,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            engine_path: Some("stockfish".to_string()),
            difficulty: AIDifficulty::Medium,
            analysis_budget_ms: 100,
            handshake_timeout_ms: 10_000,
            save_path: PathBuf::from("saved_game.json"),
            pgn_path: PathBuf::from("saved_game.pgn"),
        }
    }
}

impl SessionSettings {
    pub fn analysis_budget(&self) -> Duration {
        Duration::from_millis(self.analysis_budget_ms)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            handshake_timeout: Duration::from_millis(self.handshake_timeout_ms),
            ..EngineOptions::default()
        }
    }

    /// Reject values that would stall or disable the engine outright
    pub fn validate(&self) -> CoreResult<()> {
        if self.analysis_budget_ms == 0 {
            return Err(CoreError::InvalidConfig {
                message: "analysis_budget_ms must be positive".to_string(),
            });
        }
        if self.handshake_timeout_ms == 0 {
            return Err(CoreError::InvalidConfig {
                message: "handshake_timeout_ms must be positive".to_string(),
            });
        }
        Ok(())
    }
}
