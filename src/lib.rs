//! fenboard - interactive chess board session core
//!
//! # Module Organization
//!
//! - `game` - the play session: board, selection, promotion, clocks, outcome,
//!   engine auto-play, save/load and PGN export
//! - `analyzer` - PGN review with stepping and an evaluation bar
//! - `input` - pointer geometry for mapping pixels onto squares
//! - `core` - settings and their persistence
//! - `cli` - command line arguments and the terminal driver's word list
//!
//! Move legality lives in the `fenboard-rules` crate and the engine process in
//! `fenboard-uci`; this crate wires them into something a front end can poll.

pub mod analyzer;
pub mod cli;
pub mod core;
pub mod game;
pub mod input;
