//! Error types for the rules adapter
//!
//! Every fallible operation of the adapter, the projector and the PGN codec
//! reports one of these variants. Callers in the session layer map them onto
//! their own recovery policy; none of them is fatal.

use thiserror::Error;

/// Errors that can occur while validating, applying or converting chess data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// The move is well-formed but not legal in the current position
    #[error("Illegal move: {notation}")]
    IllegalMove { notation: String },

    /// The text is not a coordinate move at all
    #[error("Invalid move notation: {notation:?}")]
    InvalidNotation { notation: String },

    /// Undo requested at the root of the move record
    #[error("No move to undo")]
    NoHistory,

    /// FEN text could not be parsed or describes an impossible position
    #[error("Invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },

    /// FEN placement field does not describe 8 ranks of 8 squares
    #[error("Invalid piece placement: {reason}")]
    InvalidPlacement { reason: String },

    /// PGN text could not be read as a game
    #[error("Malformed PGN: {reason}")]
    MalformedPgn { reason: String },
}

/// Result type alias for rules operations
pub type RulesResult<T> = Result<T, RulesError>;
