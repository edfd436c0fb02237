//! Error types for game module
//!
//! Provides custom error types for session logic: move validation, engine
//! availability, history, and the save/load/import file contracts. None of
//! these are fatal; each is recovered by leaving the session as it was.

use fenboard_rules::RulesError;
use fenboard_uci::EngineError;

/// Errors that can occur in game logic
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Candidate move rejected by the rules
    #[error("Illegal move: {notation}")]
    IllegalMove { notation: String },

    /// No engine configured, or the engine stopped responding
    #[error("Engine unavailable: {reason}")]
    EngineUnavailable { reason: String },

    /// Undo or step back with nothing to take back
    #[error("No move to take back")]
    NoHistory,

    /// Saved game file exists but cannot be used
    #[error("Malformed save file: {reason}")]
    MalformedSave { reason: String },

    /// PGN text could not be imported
    #[error("Malformed PGN import: {reason}")]
    MalformedImport { reason: String },

    /// Reading or writing a game file failed
    #[error("Game file I/O error: {0}")]
    SaveIo(#[from] std::io::Error),

    /// Move input after the outcome was recorded
    #[error("Game is over: {message}")]
    GameOver { message: String },

    /// Ordinary move input while a promotion choice is outstanding
    #[error("A promotion choice is pending")]
    PromotionPending,
}

impl From<RulesError> for GameError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::IllegalMove { notation } | RulesError::InvalidNotation { notation } => {
                GameError::IllegalMove { notation }
            }
            RulesError::NoHistory => GameError::NoHistory,
            RulesError::MalformedPgn { reason } => GameError::MalformedImport { reason },
            other @ (RulesError::InvalidFen { .. } | RulesError::InvalidPlacement { .. }) => {
                GameError::MalformedSave {
                    reason: other.to_string(),
                }
            }
        }
    }
}

impl From<EngineError> for GameError {
    fn from(err: EngineError) -> Self {
        GameError::EngineUnavailable {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
