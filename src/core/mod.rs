//! Core application configuration
//!
//! # Module Organization
//!
//! - `settings` - [`SessionSettings`]: engine path, difficulty, budgets and
//!   game file locations
//! - `settings_persistence` - JSON load/save of settings under the user's
//!   configuration directory
//! - `error` - [`CoreError`] and [`CoreResult`]

pub mod error;
pub mod settings;
pub mod settings_persistence;

pub use error::{CoreError, CoreResult};
pub use settings::{time_preset, SessionSettings, TIME_PRESETS};
pub use settings_persistence::{load_settings, read_settings, save_settings, settings_path};
