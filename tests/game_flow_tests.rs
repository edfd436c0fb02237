//! Game Flow Integration Tests
//!
//! Tests for full session flows including:
//! - Click-driven moves and pawn promotion
//! - Clock adjudication and the outcome overlay
//! - Engine auto-play and undo
//! - Save/load and PGN export through temp files
//! - Analyzer import

use fenboard::analyzer::{Analyzer, AnalyzerEvent};
use fenboard::core::SessionSettings;
use fenboard::game::ai::{EngineLiaison, GameMode};
use fenboard::game::resources::GameOverState;
use fenboard::game::{Command, GameError, GameSession, InputEvent, PersistedGameState, SessionConfig};
use fenboard_rules::{Color, Role, Square};
use fenboard_uci::ScriptedEngine;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use web_time::Instant;

fn temp_path(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fenboard_test_{}.{}", uuid::Uuid::new_v4(), extension))
}

fn settings_with_temp_files() -> SessionSettings {
    SessionSettings {
        save_path: temp_path("json"),
        pgn_path: temp_path("pgn"),
        ..SessionSettings::default()
    }
}

fn hot_seat(time_limit: Option<f64>, now: Instant) -> GameSession {
    let config = SessionConfig {
        mode: GameMode::VsHuman,
        time_limit,
        settings: settings_with_temp_files(),
    };
    GameSession::new(config, EngineLiaison::disconnected(), now)
}

fn against_engine(engine: ScriptedEngine, now: Instant) -> GameSession {
    against_engine_timed(engine, None, now)
}

fn against_engine_timed(engine: ScriptedEngine, time_limit: Option<f64>, now: Instant) -> GameSession {
    let config = SessionConfig {
        mode: GameMode::VsEngine {
            engine_color: Color::Black,
        },
        time_limit,
        settings: settings_with_temp_files(),
    };
    GameSession::new(config, EngineLiaison::with_backend(Box::new(engine)), now)
}

fn clicks(squares: &[Square]) -> Vec<InputEvent> {
    squares.iter().copied().map(InputEvent::Click).collect()
}

/// Load `fen` into `session` through a save file
fn load_position(session: &mut GameSession, fen: &str, now: Instant) {
    let path = temp_path("json");
    let state = PersistedGameState {
        fen: fen.to_string(),
        white_clock: 0.0,
        black_clock: 0.0,
        bot: false,
        moves: Vec::new(),
    };
    state.write_to(&path).unwrap();
    assert!(session.load_from(&path, now).unwrap());
    let _ = fs::remove_file(path);
}

// ============================================================================
// Moves and Promotion
// ============================================================================

#[test]
fn test_opening_moves_by_click() {
    let now = Instant::now();
    let mut session = hot_seat(None, now);

    session.tick(now, clicks(&[Square::E2, Square::E4, Square::E7, Square::E5]));

    assert_eq!(session.board().moves(), ["e2e4", "e7e5"]);
    assert_eq!(session.pieces().get(Square::E4), Some('P'));
    assert_eq!(session.pieces().get(Square::E5), Some('p'));
    assert_eq!(session.pieces().get(Square::E2), None);
    assert_eq!(session.board().turn(), Color::White);
}

#[test]
fn test_fools_mate_records_checkmate() {
    let now = Instant::now();
    let mut session = hot_seat(None, now);

    session.tick(
        now,
        clicks(&[
            Square::F2,
            Square::F3,
            Square::E7,
            Square::E5,
            Square::G2,
            Square::G4,
            Square::D8,
            Square::H4,
        ]),
    );

    assert_eq!(session.outcome(), GameOverState::BlackWon);
    assert!(session.outcome_visible());
    assert_eq!(session.outcome_text().as_deref(), Some("Black wins by checkmate"));
    assert!(session.check_squares().contains(&Square::E1));
    assert!(session.pgn_text().contains("[Result \"0-1\"]"));

    // Moves are rejected after the game ends
    session.tick(now, clicks(&[Square::A2]));
    assert!(!session.selection().is_selected());
}

#[test]
fn test_promotion_waits_for_piece_choice() {
    let now = Instant::now();
    let mut session = hot_seat(None, now);
    load_position(&mut session, "k7/4P3/8/8/8/8/8/7K w - - 0 1", now);

    session.tick(now, clicks(&[Square::E7, Square::E8]));
    let view = session.view(now);
    assert_eq!(view.promotion, Some((Square::E7, Square::E8)));
    assert!(session.board().moves().is_empty());

    // Clicks are refused while the choice is open
    assert!(matches!(
        session.click(Square::H1, now),
        Err(GameError::PromotionPending)
    ));

    // A king is not a valid choice and leaves the prompt open
    session.tick(now, [InputEvent::Promote(Role::King)]);
    assert!(session.pending_promotion().is_active());

    session.tick(now, [InputEvent::Promote(Role::Knight)]);
    assert!(!session.pending_promotion().is_active());
    assert_eq!(session.board().moves(), ["e7e8n"]);
    assert_eq!(session.pieces().get(Square::E8), Some('N'));
}

#[test]
fn test_every_promotion_choice_lands_on_target() {
    let cases = [
        (Role::Queen, 'Q', "e7e8q"),
        (Role::Rook, 'R', "e7e8r"),
        (Role::Bishop, 'B', "e7e8b"),
        (Role::Knight, 'N', "e7e8n"),
    ];
    for (role, letter, notation) in cases {
        let now = Instant::now();
        let mut session = hot_seat(None, now);
        load_position(&mut session, "k7/4P3/8/8/8/8/8/7K w - - 0 1", now);

        session.tick(now, clicks(&[Square::E7, Square::E8]));
        session.tick(now, [InputEvent::Promote(role)]);

        assert_eq!(session.board().moves(), [notation], "choice {:?}", role);
        assert_eq!(session.pieces().get(Square::E8), Some(letter));
        assert_eq!(session.pieces().get(Square::E7), None);
        assert_eq!(session.board().turn(), Color::Black);
    }
}

#[test]
fn test_black_capture_promotion() {
    let now = Instant::now();
    let mut session = hot_seat(None, now);
    load_position(&mut session, "4k3/8/8/8/8/8/3p4/2R3K1 b - - 0 1", now);

    session.tick(now, clicks(&[Square::D2, Square::C1]));
    assert_eq!(session.view(now).promotion, Some((Square::D2, Square::C1)));

    session.tick(now, [InputEvent::Promote(Role::Rook)]);
    assert_eq!(session.board().moves(), ["d2c1r"]);
    assert_eq!(session.pieces().get(Square::C1), Some('r'));
    assert_eq!(session.pieces().get(Square::D2), None);
    assert!(session.check_squares().contains(&Square::G1));
}

#[test]
fn test_cancelled_promotion_leaves_pawn() {
    let now = Instant::now();
    let mut session = hot_seat(None, now);
    load_position(&mut session, "k7/4P3/8/8/8/8/8/7K w - - 0 1", now);

    session.tick(now, clicks(&[Square::E7, Square::E8]));
    session.tick(now, [InputEvent::RightClick]);

    assert!(!session.pending_promotion().is_active());
    assert_eq!(session.pieces().get(Square::E7), Some('P'));
    assert_eq!(session.board().turn(), Color::White);
}

// ============================================================================
// Clocks
// ============================================================================

#[test]
fn test_time_forfeit_ends_game() {
    let t0 = Instant::now();
    let mut session = hot_seat(Some(60.0), t0);

    session.tick(t0 + Duration::from_secs(59), std::iter::empty());
    assert_eq!(session.outcome(), GameOverState::Playing);

    let flag = t0 + Duration::from_secs(60);
    session.tick(flag, std::iter::empty());
    assert_eq!(session.outcome(), GameOverState::BlackWonByTime);
    assert_eq!(session.outcome_text().as_deref(), Some("Black wins on time"));
    assert!(session.outcome_visible());

    // Frozen clocks and ignored clicks
    let later = flag + Duration::from_secs(30);
    assert_eq!(session.current_clocks(later), session.current_clocks(flag));
    session.tick(later, clicks(&[Square::E2]));
    assert!(!session.selection().is_selected());

    session.tick(later, [InputEvent::Command(Command::CloseOutcome)]);
    assert!(!session.outcome_visible());
    assert_eq!(session.outcome(), GameOverState::BlackWonByTime);
}

#[test]
fn test_clock_charged_to_mover() {
    let t0 = Instant::now();
    let mut session = hot_seat(Some(300.0), t0);

    session.tick(t0 + Duration::from_secs(5), clicks(&[Square::E2, Square::E4]));
    session.tick(t0 + Duration::from_secs(8), clicks(&[Square::E7, Square::E5]));

    let (white, black) = session.current_clocks(t0 + Duration::from_secs(8));
    assert!((white - 5.0).abs() < 1e-6);
    assert!((black - 3.0).abs() < 1e-6);
    assert_eq!(
        session.sidebar_lines(t0 + Duration::from_secs(8)),
        ["Moves: 2", "W: 295s  B: 297s"]
    );
}

#[test]
fn test_reset_after_outcome_starts_new_game() {
    let t0 = Instant::now();
    let mut session = hot_seat(Some(60.0), t0);
    let flag = t0 + Duration::from_secs(61);
    session.tick(flag, std::iter::empty());
    assert!(session.outcome().is_game_over());

    // Reset is ignored while the overlay is up
    session.tick(flag, [InputEvent::Command(Command::Reset)]);
    assert!(session.outcome().is_game_over());

    session.tick(
        flag,
        [
            InputEvent::Command(Command::CloseOutcome),
            InputEvent::Command(Command::Reset),
        ],
    );
    assert_eq!(session.outcome(), GameOverState::Playing);
    assert_eq!(session.current_clocks(flag), (0.0, 0.0));
}

#[test]
fn test_time_forfeit_pgn_export() {
    let t0 = Instant::now();
    let mut session = hot_seat(Some(60.0), t0);
    session.tick(t0, clicks(&[Square::D2, Square::D4]));
    session.tick(t0 + Duration::from_secs(70), [InputEvent::Command(Command::ExportPgn)]);

    let path = session.settings().pgn_path.clone();
    let pgn = fs::read_to_string(&path).unwrap();
    assert!(pgn.contains("[Result \"1-0\"]"), "Black flagged: {}", pgn);
    assert!(pgn.contains("1. d4 1-0"));
    let _ = fs::remove_file(path);
}

// ============================================================================
// Engine Play and Undo
// ============================================================================

#[test]
fn test_engine_replies_in_same_tick() {
    let now = Instant::now();
    let mut session = against_engine(ScriptedEngine::new().with_moves(["e7e5"]), now);
    assert!(session.auto_play());

    session.tick(now, clicks(&[Square::E2, Square::E4]));
    assert_eq!(session.board().moves(), ["e2e4", "e7e5"]);
    assert_eq!(session.board().turn(), Color::White);
}

#[test]
fn test_undo_against_engine_takes_back_both_plies() {
    let now = Instant::now();
    let mut session = against_engine(ScriptedEngine::new().with_moves(["e7e5"]), now);
    session.tick(now, clicks(&[Square::E2, Square::E4]));

    session.tick(now, [InputEvent::Command(Command::Undo)]);

    assert!(session.board().moves().is_empty());
    assert_eq!(session.board().turn(), Color::White);
    assert_eq!(session.pieces().get(Square::E2), Some('P'));
}

#[test]
fn test_engine_failure_falls_back_to_hot_seat() {
    let now = Instant::now();
    let mut session = against_engine(ScriptedEngine::new(), now);

    session.tick(now, clicks(&[Square::E2, Square::E4]));

    assert!(!session.auto_play());
    assert_eq!(session.engine_status(), "Engine not found");
    assert_eq!(session.board().moves(), ["e2e4"]);

    // Black can now be moved by hand
    session.tick(now, clicks(&[Square::E7, Square::E5]));
    assert_eq!(session.board().moves(), ["e2e4", "e7e5"]);
}

#[test]
fn test_engine_thinking_is_charged_to_engine_clock() {
    let t0 = Instant::now();
    let think = Duration::from_millis(40);
    let engine = ScriptedEngine::new()
        .with_moves(["e7e5"])
        .with_think_time(think);
    let mut session = against_engine_timed(engine, Some(300.0), t0);

    session.tick(t0, clicks(&[Square::E2, Square::E4]));
    assert_eq!(session.board().moves(), ["e2e4", "e7e5"]);

    // Queried at t0, before the engine's reply, so White has no live delta
    let (white, black) = session.current_clocks(t0);
    assert_eq!(white, 0.0);
    assert!(black >= think.as_secs_f64(), "engine clock {}", black);

    // The human's next move is charged only from the engine's reply onward
    let t1 = t0 + Duration::from_secs(5);
    session.tick(t1, clicks(&[Square::G1, Square::F3]));
    let (white, black_after) = session.current_clocks(t1);
    assert!((white + black_after - 5.0).abs() < 1e-6, "{} + {}", white, black_after);
    assert!(white < 5.0);
}

#[test]
fn test_illegal_engine_reply_disables_auto_play() {
    let now = Instant::now();
    let mut session = against_engine(ScriptedEngine::new().with_moves(["e2e4"]), now);

    session.tick(now, clicks(&[Square::D2, Square::D4]));

    assert!(!session.auto_play());
    assert_eq!(session.board().moves(), ["d2d4"]);
    assert_eq!(session.board().turn(), Color::Black);
}

// ============================================================================
// Save and Load
// ============================================================================

#[test]
fn test_save_load_round_trip() {
    let t0 = Instant::now();
    let mut session = hot_seat(Some(300.0), t0);
    session.tick(t0 + Duration::from_secs(5), clicks(&[Square::G1, Square::F3]));
    session.tick(t0 + Duration::from_secs(8), clicks(&[Square::G8, Square::F6]));
    let saved_at = t0 + Duration::from_secs(8);
    session.tick(saved_at, [InputEvent::Command(Command::Save)]);

    let path = session.settings().save_path.clone();
    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"whiteClock\""));

    let t1 = Instant::now();
    let mut restored = hot_seat(Some(300.0), t1);
    assert!(restored.load_from(&path, t1).unwrap());

    assert_eq!(restored.board().moves(), ["g1f3", "g8f6"]);
    assert_eq!(restored.board().fen(), session.board().fen());
    assert_eq!(restored.pieces(), session.pieces());
    let (white, black) = restored.current_clocks(t1);
    assert!((white - 5.0).abs() < 1e-6);
    assert!((black - 3.0).abs() < 1e-6);

    // The restored record can be undone
    assert_eq!(restored.undo(t1).unwrap(), 1);
    assert_eq!(restored.board().moves(), ["g1f3"]);
    let _ = fs::remove_file(path);
}

#[test]
fn test_bot_flag_survives_round_trip_with_engine() {
    let now = Instant::now();
    let mut session = against_engine(ScriptedEngine::new().with_moves(["e7e5"]), now);
    session.tick(now, clicks(&[Square::E2, Square::E4]));
    let path = temp_path("json");
    session.save_to(&path, now).unwrap();

    let state = PersistedGameState::read_from(&path).unwrap().unwrap();
    assert!(state.bot);

    // With an engine available, auto-play resumes against Black
    let mut with_engine = GameSession::new(
        SessionConfig::default(),
        EngineLiaison::with_backend(Box::new(ScriptedEngine::new())),
        now,
    );
    assert!(with_engine.load_from(&path, now).unwrap());
    assert!(with_engine.auto_play());
    assert_eq!(
        with_engine.mode(),
        GameMode::VsEngine {
            engine_color: Color::Black
        }
    );

    // Without one, the game loads as hot-seat
    let mut offline = hot_seat(None, now);
    assert!(offline.load_from(&path, now).unwrap());
    assert!(!offline.auto_play());
    let _ = fs::remove_file(path);
}

#[test]
fn test_missing_save_is_noop() {
    let now = Instant::now();
    let mut session = hot_seat(None, now);
    session.tick(now, clicks(&[Square::E2, Square::E4]));

    assert!(!session.load_from(&temp_path("json"), now).unwrap());
    session.tick(now, [InputEvent::Command(Command::Load)]);

    assert_eq!(session.board().moves(), ["e2e4"]);
}

#[test]
fn test_malformed_save_leaves_state_untouched() {
    let now = Instant::now();
    let mut session = hot_seat(None, now);
    session.tick(now, clicks(&[Square::E2, Square::E4]));
    let fen = session.board().fen();

    let garbage = temp_path("json");
    fs::write(&garbage, "{ not json").unwrap();
    assert!(matches!(
        session.load_from(&garbage, now),
        Err(GameError::MalformedSave { .. })
    ));

    let bad_fen = temp_path("json");
    fs::write(
        &bad_fen,
        r#"{"fen":"not a fen","whiteClock":0.0,"blackClock":0.0,"bot":false,"moves":[]}"#,
    )
    .unwrap();
    assert!(matches!(
        session.load_from(&bad_fen, now),
        Err(GameError::MalformedSave { .. })
    ));

    assert_eq!(session.board().fen(), fen);
    assert_eq!(session.board().moves(), ["e2e4"]);
    let _ = fs::remove_file(garbage);
    let _ = fs::remove_file(bad_fen);
}

#[test]
fn test_loading_finished_game_shows_outcome() {
    let now = Instant::now();
    let mut session = hot_seat(None, now);
    load_position(&mut session, "7k/6Q1/6K1/8/8/8/8/8 b - - 0 1", now);

    assert_eq!(session.outcome(), GameOverState::WhiteWon);
    assert!(session.outcome_visible());
}

// ============================================================================
// Analyzer
// ============================================================================

#[test]
fn test_analyzer_imports_file_and_ignores_bad_path() {
    let path = temp_path("pgn");
    fs::write(
        &path,
        "[Event \"Test\"]\n[White \"A\"]\n[Black \"B\"]\n\n1. e4 {best by test} e5 2. Nf3 (2. f4) Nc6 *\n",
    )
    .unwrap();

    let mut analyzer = Analyzer::new(EngineLiaison::disconnected(), Duration::from_millis(50));
    analyzer.handle(AnalyzerEvent::Load(path.clone()));
    assert_eq!(analyzer.line_len(), 4);

    analyzer.handle(AnalyzerEvent::Next);
    analyzer.handle(AnalyzerEvent::Next);
    assert_eq!(analyzer.board().moves(), ["e2e4", "e7e5"]);

    analyzer.handle(AnalyzerEvent::Load(temp_path("pgn")));
    assert_eq!(analyzer.line_len(), 4);
    assert_eq!(analyzer.cursor(), 2);
    assert_eq!(analyzer.analysis_text(), "Engine not found");
    let _ = fs::remove_file(path);
}
