//! Game resources - state owned by the session controller
//!
//! Each resource is a plain value owned by [`crate::game::session::GameSession`]
//! and mutated only inside its per-tick routine.
//!
//! # Resource Categories
//!
//! ## Player Interaction
//! - [`Selection`] - Currently selected square and its legal destinations
//! - [`PendingPromotion`] - Pawn move parked until a piece is chosen
//!
//! ## Game Timing
//! - [`GameTimer`] - Per-side elapsed time with an optional limit
//!
//! ## Game Status
//! - [`GameOverState`] - Win/loss/draw conditions

pub mod game_over;
pub mod promotion;
pub mod selection;
pub mod timer;

pub use game_over::GameOverState;
pub use promotion::{is_promotion_choice, parse_promotion_choice, PendingPromotion};
pub use selection::Selection;
pub use timer::GameTimer;
