//! Chess rules adapter for fenboard
//!
//! Wraps the `shakmaty` rules library behind the narrow capability set the
//! session layer needs, so that no other crate in the workspace touches move
//! generation directly.
//!
//! # Module Organization
//!
//! - `board` - [`BoardAdapter`]: authoritative position + move record, legality,
//!   push/pop, FEN import/export, check and termination queries
//! - `projection` - [`PieceMap`]: square → piece letter map derived from the
//!   FEN placement field, used for rendering and click lookups
//! - `pgn` - PGN export of a finished or ongoing game and PGN import for the
//!   analyzer
//! - `error` - [`RulesError`] and the [`RulesResult`] alias
//!
//! # Notation
//!
//! Moves cross the crate boundary in coordinate (UCI) notation such as
//! `"e2e4"` or `"e7e8q"`. Squares are `shakmaty::Square` values whose
//! `Display` is the algebraic name.

pub mod board;
pub mod error;
pub mod pgn;
pub mod projection;

pub use board::{
    fen_of, move_notation, parse_fen, BoardAdapter, BoardResult, Destination, DestinationKind,
    Termination,
};
pub use error::{RulesError, RulesResult};
pub use pgn::{export_pgn, parse_pgn, PgnGame, PgnHeaders};
pub use projection::{expand_rank, project_placement, PieceMap};

pub use shakmaty::{Chess, Color, Move, Piece, Role, Square};
