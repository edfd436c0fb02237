//! Engine play configuration: game mode and difficulty
//!
//! # Game Modes
//!
//! - **VsHuman**: Two human players (local hot-seat)
//! - **VsEngine**: One human player vs the external engine (specify engine color)
//!
//! # Difficulty Levels
//!
//! Difficulty is the search time granted per engine move:
//!
//! | Difficulty | Time/Move |
//! |------------|-----------|
//! | Easy       | 0.5s      |
//! | Medium     | 1.5s      |
//! | Hard       | 3.0s      |
//!
//! # Integration
//!
//! ```rust,ignore
//! let mode = GameMode::VsEngine { engine_color: Color::Black };
//! if mode.engine_color() == Some(board.turn()) && session.auto_play() {
//!     // engine's turn
//! }
//! ```

use fenboard_rules::Color;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Who controls each side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Two humans at one board
    #[default]
    VsHuman,

    /// Human vs engine
    ///
    /// The engine moves whenever `engine_color` is to move and auto-play is on.
    VsEngine {
        /// The color the engine plays
        engine_color: Color,
    },
}

impl GameMode {
    /// The engine's color, if the engine plays at all
    pub fn engine_color(self) -> Option<Color> {
        match self {
            GameMode::VsHuman => None,
            GameMode::VsEngine { engine_color } => Some(engine_color),
        }
    }

    /// Whether `color` is controlled by a human
    pub fn is_human(self, color: Color) -> bool {
        self.engine_color() != Some(color)
    }
}

/// Engine difficulty levels corresponding to search time per move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AIDifficulty {
    /// Easy - 0.5 seconds per move
    Easy,
    /// Medium - 1.5 seconds per move
    #[default]
    Medium,
    /// Hard - 3.0 seconds per move
    Hard,
}

impl AIDifficulty {
    /// Search time per engine move in seconds
    ///
    /// - Easy: 0.5s
    /// - Medium: 1.5s
    /// - Hard: 3.0s
    pub fn seconds_per_move(self) -> f32 {
        match self {
            AIDifficulty::Easy => 0.5,
            AIDifficulty::Medium => 1.5,
            AIDifficulty::Hard => 3.0,
        }
    }

    /// Search budget handed to the engine
    pub fn move_budget(self) -> Duration {
        Duration::from_secs_f32(self.seconds_per_move())
    }
}
