//! Command line and terminal driver vocabulary
//!
//! [`Cli`] is the `clap` definition of the binary's arguments. The
//! `parse_*_line` functions translate one line typed at the terminal driver
//! into the events a tick consumes.
//!
//! # Play Mode Words
//!
//! `click e2`, `right`, `promote q`, `undo`, `reset`, `save`, `load`, `pgn`,
//! `history`, `ai`, `close`, `menu`, `cancel`. A bare square (`e2`) is a click.
//! `at <x> <y>` clicks at a pixel position, mapped through a [`BoardGeometry`].
//!
//! # Analyzer Mode Words
//!
//! `click e2`, `right`, `next`, `prev`, `reset`, `load <path>`.

use crate::analyzer::AnalyzerEvent;
use crate::core::time_preset;
use crate::game::resources::parse_promotion_choice;
use crate::game::ai::GameMode;
use crate::game::{Command, InputEvent};
use crate::input::BoardGeometry;
use clap::{Parser, Subcommand, ValueEnum};
use fenboard_rules::{Color, Square};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fenboard", version, about = "Interactive chess board with engine play and PGN analysis")]
pub struct Cli {
    /// Engine executable (overrides the settings file)
    #[arg(long, global = true)]
    pub engine: Option<String>,

    /// Settings file (defaults to the user configuration directory)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Mode {
    /// Play a game
    Play {
        /// `human` for hot-seat, `bot` to play the engine
        #[arg(long = "mode", value_enum, default_value_t = Opponent::Human)]
        opponent: Opponent,

        /// Color of the human player against the engine
        #[arg(long, value_enum, default_value_t = Side::White)]
        color: Side,

        /// Seconds per side, or a preset: 1m, 3m, 10m, 1h
        #[arg(long, value_parser = parse_time_limit)]
        time: Option<f64>,
    },
    /// Step through a PGN game with engine evaluation
    Analyze {
        /// PGN file to open
        pgn: Option<PathBuf>,
    },
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Play {
            opponent: Opponent::Human,
            color: Side::White,
            time: None,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opponent {
    Human,
    Bot,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

/// Game mode for an opponent choice and the human's color
pub fn game_mode(opponent: Opponent, human: Side) -> GameMode {
    match opponent {
        Opponent::Human => GameMode::VsHuman,
        Opponent::Bot => GameMode::VsEngine {
            engine_color: !Color::from(human),
        },
    }
}

/// Seconds or a preset label
pub fn parse_time_limit(text: &str) -> Result<f64, String> {
    if let Some(seconds) = time_preset(text) {
        return Ok(seconds);
    }
    match text.parse::<f64>() {
        Ok(seconds) if seconds.is_finite() && seconds > 0.0 => Ok(seconds),
        _ => Err(format!("expected seconds or one of 1m, 3m, 10m, 1h; got {:?}", text)),
    }
}

fn parse_square(text: &str) -> Option<Square> {
    Square::from_ascii(text.trim().to_ascii_lowercase().as_bytes()).ok()
}

/// Board placement the driver uses for `at <x> <y>`; Black's view when flipped
pub fn driver_geometry(flipped: bool) -> BoardGeometry {
    let geometry = BoardGeometry::new(0.0, 0.0, 800.0);
    if flipped {
        geometry.flipped()
    } else {
        geometry
    }
}

/// One play-mode line; `None` for anything unrecognised
pub fn parse_play_line(line: &str, geometry: &BoardGeometry) -> Option<InputEvent> {
    let mut words = line.split_whitespace();
    let word = words.next()?.to_ascii_lowercase();
    let arg = words.next();
    let event = match word.as_str() {
        "click" => InputEvent::Click(parse_square(arg?)?),
        "at" => {
            let x = arg?.parse::<f32>().ok()?;
            let y = words.next()?.parse::<f32>().ok()?;
            InputEvent::Click(geometry.square_at(x, y)?)
        }
        "right" => InputEvent::RightClick,
        "promote" => InputEvent::Promote(parse_promotion_choice(arg?.chars().next()?)?),
        "undo" => Command::Undo.into(),
        "reset" => Command::Reset.into(),
        "save" => Command::Save.into(),
        "load" => Command::Load.into(),
        "pgn" => Command::ExportPgn.into(),
        "history" => Command::ToggleHistory.into(),
        "ai" => Command::ToggleAutoPlay.into(),
        "close" => Command::CloseOutcome.into(),
        "menu" => Command::ReturnToMenu.into(),
        "cancel" => Command::Cancel.into(),
        other => InputEvent::Click(parse_square(other)?),
    };
    Some(event)
}

/// One analyzer-mode line; `None` for anything unrecognised
pub fn parse_analyzer_line(line: &str) -> Option<AnalyzerEvent> {
    let mut words = line.split_whitespace();
    let word = words.next()?.to_ascii_lowercase();
    let event = match word.as_str() {
        "click" => AnalyzerEvent::Click(parse_square(words.next()?)?),
        "right" => AnalyzerEvent::RightClick,
        "next" | "n" => AnalyzerEvent::Next,
        "prev" | "p" => AnalyzerEvent::Prev,
        "reset" | "r" => AnalyzerEvent::Reset,
        "load" | "l" => AnalyzerEvent::Load(PathBuf::from(words.collect::<Vec<_>>().join(" "))),
        other => AnalyzerEvent::Click(parse_square(other)?),
    };
    Some(event)
}
