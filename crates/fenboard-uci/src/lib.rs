//! UCI engine driver for fenboard
//!
//! Talks to an external chess engine (Stockfish or any UCI-compatible binary)
//! as a child process. Requests are synchronous and time-boxed: the caller
//! supplies a budget and gets a move or an evaluation back, or an error once
//! the budget plus a grace period has passed.
//!
//! # Module Organization
//!
//! - `process` - [`UciEngine`]: spawn, handshake, `go movetime`, quit
//! - `protocol` - parsing of `info` and `bestmove` lines, [`Score`]
//! - `scripted` - [`ScriptedEngine`]: in-memory backend with canned replies
//! - `error` - [`EngineError`] and [`EngineResult`]
//!
//! # Integration
//!
//! The session layer depends on the [`EngineBackend`] trait only, so tests and
//! offline builds can swap in [`ScriptedEngine`].
//!
//! ```rust,ignore
//! let mut engine = UciEngine::spawn("stockfish", EngineOptions::default())?;
//! let reply = engine.best_move(fen, Duration::from_millis(500))?;
//! ```

pub mod error;
pub mod process;
pub mod protocol;
pub mod scripted;

pub use error::{EngineError, EngineResult};
pub use process::{EngineOptions, UciEngine};
pub use protocol::{Evaluation, Score, MATE_VALUE};
pub use scripted::ScriptedEngine;

use std::time::Duration;

/// Anything that can pick moves and evaluate positions given as FEN
pub trait EngineBackend: Send {
    /// Best move in coordinate notation, searched for at most `budget`
    fn best_move(&mut self, fen: &str, budget: Duration) -> EngineResult<String>;

    /// Score (side to move's view) and principal variation
    fn evaluate(&mut self, fen: &str, budget: Duration) -> EngineResult<Evaluation>;

    /// Engine identification for logs and PGN headers
    fn name(&self) -> &str;
}
