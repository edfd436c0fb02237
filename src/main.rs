//! Terminal front end
//!
//! Reads one command per line from stdin, runs it through a tick, and prints
//! the polled board. See [`fenboard::cli`] for the accepted words.

use anyhow::{Context, Result};
use clap::Parser;
use fenboard::analyzer::Analyzer;
use fenboard::cli::{
    driver_geometry, game_mode, parse_analyzer_line, parse_play_line, Cli, Mode, Opponent, Side,
};
use fenboard::core::{load_settings, SessionSettings};
use fenboard::game::ai::EngineLiaison;
use fenboard::game::{GameSession, SessionConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use web_time::Instant;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(cli.settings.as_deref());
    if let Some(engine) = cli.engine {
        settings.engine_path = Some(engine);
    }

    match cli.command.unwrap_or_default() {
        Mode::Play {
            opponent,
            color,
            time,
        } => run_play(settings, opponent, color, time),
        Mode::Analyze { pgn } => run_analyzer(settings, pgn),
    }
}

fn connect_engine(settings: &SessionSettings) -> EngineLiaison {
    EngineLiaison::connect(settings.engine_path.as_deref(), settings.engine_options())
}

fn prompt(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    write!(stdout, "> ")?;
    stdout.flush().context("flushing stdout")
}

fn run_play(settings: SessionSettings, opponent: Opponent, color: Side, time: Option<f64>) -> Result<()> {
    let engine = connect_engine(&settings);
    let config = SessionConfig {
        mode: game_mode(opponent, color),
        time_limit: time,
        settings,
    };
    let geometry = driver_geometry(color == Side::Black);
    let mut session = GameSession::new(config, engine, Instant::now());
    info!("[GAME] New game: {:?}, time limit {:?}", session.mode(), time);

    // The engine may be White and move before any input.
    session.tick(Instant::now(), std::iter::empty());
    prompt(&session.view(Instant::now()).to_text())?;

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        let event = parse_play_line(trimmed, &geometry);
        if event.is_none() && !trimmed.is_empty() {
            warn!("[GAME] Unrecognised input {:?}", trimmed);
        }
        let now = Instant::now();
        session.tick(now, event);

        let view = session.view(now);
        if view.wants_menu {
            info!("[GAME] Returning to menu");
            break;
        }
        prompt(&view.to_text())?;
    }
    Ok(())
}

fn run_analyzer(settings: SessionSettings, pgn: Option<PathBuf>) -> Result<()> {
    let engine = connect_engine(&settings);
    let mut analyzer = Analyzer::new(engine, settings.analysis_budget());
    if let Some(path) = pgn {
        analyzer
            .load_pgn_file(&path)
            .with_context(|| format!("opening {}", path.display()))?;
    }
    prompt(&analyzer_text(&analyzer))?;

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("menu") {
            break;
        }
        match parse_analyzer_line(trimmed) {
            Some(event) => analyzer.handle(event),
            None if !trimmed.is_empty() => warn!("[ANALYZER] Unrecognised input {:?}", trimmed),
            None => {}
        }
        prompt(&analyzer_text(&analyzer))?;
    }
    Ok(())
}

fn analyzer_text(analyzer: &Analyzer) -> String {
    let mut lines = vec![analyzer.title().to_string()];
    for (index, row) in analyzer.pieces().to_rows().into_iter().enumerate() {
        lines.push(format!("{} {}", 8 - index, row));
    }
    let filled = ((analyzer.eval_bar() * 20.0).round() as usize).min(20);
    lines.push(format!(
        "Ply {}/{}  [{}{}]",
        analyzer.cursor(),
        analyzer.line_len(),
        "#".repeat(filled),
        "-".repeat(20 - filled)
    ));
    lines.push(analyzer.analysis_text().to_string());
    lines.push(format!("Recent: {}", analyzer.recent_moves_text()));
    lines.join("\n")
}
