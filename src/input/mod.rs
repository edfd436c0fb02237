//! Input module - pointer mapping
//!
//! # Architecture
//!
//! - `pointer` - [`BoardGeometry`]: pixel position → board square, and the
//!   pixel rectangle of each square for the renderer
//!
//! Front ends translate raw clicks through [`BoardGeometry`] and hand the
//! result to the session as [`crate::game::InputEvent::Click`].

pub mod pointer;

pub use pointer::BoardGeometry;
