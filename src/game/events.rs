//! Input events consumed by the session once per tick
//!
//! Pixel coordinates are mapped to squares before they get here
//! (see [`crate::input::pointer::BoardGeometry`]).

use fenboard_rules::{Role, Square};

/// One discrete input collected during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Primary click on a board square
    Click(Square),
    /// Secondary click anywhere; cancels selection and pending promotion
    RightClick,
    /// Piece chosen for a pending promotion
    Promote(Role),
    Command(Command),
}

/// Keyboard and button commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Reset,
    Save,
    Load,
    ExportPgn,
    ToggleHistory,
    ToggleAutoPlay,
    /// Hide the outcome overlay
    CloseOutcome,
    ReturnToMenu,
    /// Drop the selection and any pending promotion
    Cancel,
}

impl From<Command> for InputEvent {
    fn from(command: Command) -> Self {
        InputEvent::Command(command)
    }
}
