//! Engine opponent and analysis support
//!
//! The external engine is reached only through [`EngineLiaison`], which
//! tolerates the engine being absent or failing mid-session.
//!
//! # Architecture
//!
//! - `resource`: [`GameMode`] (who plays which side) and [`AIDifficulty`]
//!   (search time per move)
//! - `liaison`: [`EngineLiaison`] over a `fenboard_uci::EngineBackend`, plus
//!   the evaluation-bar mapping
//!
//! # Integration Strategy
//!
//! The board adapter is the source of truth. On the engine's turn:
//! 1. Send the current FEN with the difficulty's move budget
//! 2. Validate the reply through the same adapter call human moves use
//! 3. Apply it and run the usual post-move bookkeeping
//!
//! This ensures engine moves follow the same validation rules as human moves.

pub mod liaison;
pub mod resource;

pub use liaison::{eval_bar_value, white_relative, EngineLiaison, ENGINE_MISSING};
pub use resource::{AIDifficulty, GameMode};
