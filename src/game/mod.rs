//! Chess game logic module - one interactive board session
//!
//! # Module Organization
//!
//! - `session` - [`GameSession`]: the controller that owns the board and runs
//!   one input cycle per tick
//! - `resources` - state the session owns (selection, pending promotion,
//!   clocks, outcome)
//! - `ai` - game mode, engine difficulty and the engine liaison
//! - `events` - [`InputEvent`] and [`Command`] fed into each tick
//! - `persistence` - the saved-game JSON contract
//! - `view` - [`SessionView`], the per-frame snapshot for renderers
//! - `error` - [`GameError`] and [`GameResult`]
//!
//! # Data Flow
//!
//! ```text
//! input ──▶ InputEvent ──▶ GameSession::tick ──▶ BoardAdapter (fenboard-rules)
//!                                │                    │
//!                                ├──▶ EngineLiaison ──┘ (fenboard-uci)
//!                                ▼
//!                          GameSession::view ──▶ renderer
//! ```

pub mod ai;
pub mod error;
pub mod events;
pub mod persistence;
pub mod resources;
pub mod session;
pub mod view;

pub use error::{GameError, GameResult};
pub use events::{Command, InputEvent};
pub use persistence::PersistedGameState;
pub use session::{GameSession, SessionConfig};
pub use view::SessionView;
