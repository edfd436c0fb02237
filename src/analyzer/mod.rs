//! Analyzer mode - step through an imported game with an evaluation bar
//!
//! The analyzer holds an imported PGN line (start position plus mainline) and
//! a cursor into it. Stepping replays or takes back one ply on the analysis
//! board; after every position change the engine evaluates the new position
//! within the analysis budget.
//!
//! # Exploring Side Lines
//!
//! Clicking a piece and then a legal destination plays that move on the
//! analysis board (pawns auto-promote to a queen). The loaded line after the
//! cursor is replaced by the new move, so `next` no longer follows the
//! original game from there.
//!
//! # Engine Absence
//!
//! Without an engine the analysis text reads `"Engine not found"` and the bar
//! stays level; stepping and exploring keep working.

use crate::game::ai::{eval_bar_value, EngineLiaison, ENGINE_MISSING};
use crate::game::error::{GameError, GameResult};
use crate::game::resources::Selection;
use fenboard_rules::{
    fen_of, parse_pgn, project_placement, BoardAdapter, Move, PgnGame, PieceMap, Square,
};
use shakmaty::Chess;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How many recent moves the side panel lists
pub const RECENT_MOVES: usize = 8;

/// Inputs understood in analyzer mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerEvent {
    Click(Square),
    RightClick,
    Next,
    Prev,
    /// Back to the start of the loaded game
    Reset,
    /// Import a PGN file, keeping the current game if it fails
    Load(std::path::PathBuf),
}

/// Imported game under review
pub struct Analyzer {
    start: Chess,
    line: Vec<Move>,
    cursor: usize,
    board: BoardAdapter,
    pieces: PieceMap,
    selection: Selection,
    engine: EngineLiaison,
    budget: Duration,
    analysis: String,
    bar: f32,
    title: String,
}

impl Analyzer {
    /// Analyzer on the standard start position with an empty line
    pub fn new(engine: EngineLiaison, budget: Duration) -> Self {
        let board = BoardAdapter::new();
        let mut analyzer = Self {
            start: board.position().clone(),
            line: Vec::new(),
            cursor: 0,
            pieces: PieceMap::default(),
            board,
            selection: Selection::default(),
            engine,
            budget,
            analysis: String::new(),
            bar: 0.5,
            title: players_title(None, None),
        };
        analyzer.refresh();
        analyzer
    }

    pub fn board(&self) -> &BoardAdapter {
        &self.board
    }

    pub fn pieces(&self) -> &PieceMap {
        &self.pieces
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Plies played from the start of the line
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn line_len(&self) -> usize {
        self.line.len()
    }

    /// `"Score: S  Best: M"`, or the engine placeholder
    pub fn analysis_text(&self) -> &str {
        &self.analysis
    }

    /// Evaluation bar fill in `[0, 1]`; 1 is White winning
    pub fn eval_bar(&self) -> f32 {
        self.bar
    }

    /// `"White vs Black"` from the loaded game's tags
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The last few moves played on the analysis board
    pub fn recent_moves_text(&self) -> String {
        let moves = self.board.moves();
        let skip = moves.len().saturating_sub(RECENT_MOVES);
        moves[skip..].join(" ")
    }

    /// Replace the game with PGN text; on failure the current game stays
    pub fn load_pgn_text(&mut self, text: &str) -> GameResult<()> {
        let game = parse_pgn(text).map_err(|e| GameError::MalformedImport {
            reason: e.to_string(),
        })?;
        self.install(game)
    }

    /// Replace the game with a PGN file; on failure the current game stays
    pub fn load_pgn_file(&mut self, path: &Path) -> GameResult<()> {
        let text = fs::read_to_string(path).map_err(|e| GameError::MalformedImport {
            reason: format!("{}: {}", path.display(), e),
        })?;
        self.load_pgn_text(&text)?;
        info!("[ANALYZER] Loaded {:?} ({} plies)", path, self.line.len());
        Ok(())
    }

    fn install(&mut self, game: PgnGame) -> GameResult<()> {
        let board = game.start_board()?;
        self.title = players_title(game.tag("White"), game.tag("Black"));
        self.start = game.start;
        self.line = game.moves;
        self.cursor = 0;
        self.board = board;
        self.selection.clear();
        self.refresh();
        Ok(())
    }

    /// Play the next move of the line; `false` at the end
    pub fn next(&mut self) -> bool {
        let Some(m) = self.line.get(self.cursor).cloned() else {
            return false;
        };
        if let Err(e) = self.board.apply_move(&m) {
            warn!("[ANALYZER] Line move {} no longer fits: {}", self.cursor + 1, e);
            return false;
        }
        self.cursor += 1;
        self.selection.clear();
        self.refresh();
        true
    }

    /// Take back one ply; `false` at the start
    pub fn prev(&mut self) -> bool {
        if self.cursor == 0 || self.board.undo().is_err() {
            return false;
        }
        self.cursor -= 1;
        self.selection.clear();
        self.refresh();
        true
    }

    /// Back to the start position of the loaded game
    pub fn reset(&mut self) {
        match BoardAdapter::from_fen(&fen_of(&self.start)) {
            Ok(board) => self.board = board,
            Err(e) => warn!("[ANALYZER] Cannot rebuild start position: {}", e),
        }
        self.cursor = 0;
        self.selection.clear();
        self.refresh();
    }

    /// Select a piece, play a selected piece's move, or clear the selection
    pub fn click(&mut self, square: Square) {
        let own_piece = self
            .board
            .piece_at(square)
            .is_some_and(|piece| piece.color == self.board.turn());

        let Some(from) = self.selection.selected_square else {
            if own_piece {
                let destinations = self.board.legal_destinations(square);
                self.selection.select(square, destinations);
            }
            return;
        };

        if self.selection.allows(square) {
            let mut notation = format!("{}{}", from, square);
            if self.board.is_promotion(&notation) {
                notation.push('q');
            }
            self.play_side_line(&notation);
            return;
        }
        self.selection.clear();
    }

    fn play_side_line(&mut self, notation: &str) {
        match self.board.apply(notation) {
            Ok(m) => {
                self.line.truncate(self.cursor);
                self.line.push(m);
                self.cursor += 1;
                debug!("[ANALYZER] Explored {}", notation);
            }
            Err(e) => debug!("[ANALYZER] {} rejected: {}", notation, e),
        }
        self.selection.clear();
        self.refresh();
    }

    /// Dispatch one analyzer input
    pub fn handle(&mut self, event: AnalyzerEvent) {
        match event {
            AnalyzerEvent::Click(square) => self.click(square),
            AnalyzerEvent::RightClick => self.selection.clear(),
            AnalyzerEvent::Next => {
                self.next();
            }
            AnalyzerEvent::Prev => {
                self.prev();
            }
            AnalyzerEvent::Reset => self.reset(),
            AnalyzerEvent::Load(path) => {
                if let Err(e) = self.load_pgn_file(&path) {
                    warn!("[ANALYZER] {}; keeping current game", e);
                }
            }
        }
    }

    /// Recompute the projection and the engine's view of the position
    fn refresh(&mut self) {
        self.pieces = project_placement(&self.board.board_fen()).unwrap_or_default();

        match self.engine.evaluate(&self.board.fen(), self.budget) {
            Ok(eval) => {
                self.analysis = match eval.best_move() {
                    Some(best) => format!("Score: {}  Best: {}", eval.score, best),
                    None => format!("Score: {}", eval.score),
                };
                self.bar = eval_bar_value(eval.score, self.board.turn());
            }
            Err(_) => {
                self.analysis = ENGINE_MISSING.to_string();
                self.bar = 0.5;
            }
        }
    }
}

fn players_title(white: Option<&str>, black: Option<&str>) -> String {
    format!("{} vs {}", white.unwrap_or("?"), black.unwrap_or("?"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fenboard_uci::{Evaluation, Score, ScriptedEngine};

    const GAME: &str = "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 *";

    fn offline() -> Analyzer {
        Analyzer::new(EngineLiaison::disconnected(), Duration::from_millis(100))
    }

    #[test]
    fn test_offline_analyzer_reports_missing_engine() {
        //! No engine: placeholder text and a level bar
        let analyzer = offline();
        assert_eq!(analyzer.analysis_text(), "Engine not found");
        assert_eq!(analyzer.eval_bar(), 0.5);
        assert_eq!(analyzer.pieces().len(), 32);
    }

    #[test]
    fn test_step_forward_and_back() {
        //! next/prev walk the mainline one ply at a time
        let mut analyzer = offline();
        analyzer.load_pgn_text(GAME).unwrap();
        assert_eq!(analyzer.line_len(), 6);
        assert_eq!(analyzer.title(), "? vs ?");
        assert!(!analyzer.prev(), "cannot step back from the start");

        assert!(analyzer.next());
        assert!(analyzer.next());
        assert_eq!(analyzer.cursor(), 2);
        assert_eq!(analyzer.recent_moves_text(), "e2e4 e7e5");

        assert!(analyzer.prev());
        assert_eq!(analyzer.board().moves(), ["e2e4"]);
    }

    #[test]
    fn test_title_comes_from_player_tags() {
        //! White and Black tags name the game
        let mut analyzer = offline();
        analyzer
            .load_pgn_text("[White \"Morphy\"]\n[Black \"Duke\"]\n\n1. e4 e5 *")
            .unwrap();
        assert_eq!(analyzer.title(), "Morphy vs Duke");
    }

    #[test]
    fn test_next_stops_at_end_of_line() {
        //! Stepping past the last move does nothing
        let mut analyzer = offline();
        analyzer.load_pgn_text("1. d4 *").unwrap();
        assert!(analyzer.next());
        assert!(!analyzer.next());
        assert_eq!(analyzer.cursor(), 1);
    }

    #[test]
    fn test_reset_returns_to_start() {
        //! Reset goes back to cursor zero
        let mut analyzer = offline();
        analyzer.load_pgn_text(GAME).unwrap();
        analyzer.next();
        analyzer.next();
        analyzer.reset();
        assert_eq!(analyzer.cursor(), 0);
        assert!(analyzer.board().moves().is_empty());
    }

    #[test]
    fn test_malformed_import_keeps_current_game() {
        //! A bad PGN leaves the loaded game and cursor untouched
        let mut analyzer = offline();
        analyzer.load_pgn_text(GAME).unwrap();
        analyzer.next();
        let before = analyzer.board().fen();

        let err = analyzer.load_pgn_text("1. e4 Ke7 2. Qxe7 *").unwrap_err();
        assert!(matches!(err, GameError::MalformedImport { .. }));
        assert_eq!(analyzer.board().fen(), before);
        assert_eq!(analyzer.cursor(), 1);
        assert_eq!(analyzer.line_len(), 6);
    }

    #[test]
    fn test_click_move_replaces_rest_of_line() {
        //! A side line truncates the loaded continuation
        let mut analyzer = offline();
        analyzer.load_pgn_text(GAME).unwrap();
        analyzer.next();
        analyzer.click(Square::C7);
        analyzer.click(Square::C5);
        assert_eq!(analyzer.cursor(), 2);
        assert_eq!(analyzer.line_len(), 2);
        assert_eq!(analyzer.board().moves(), ["e2e4", "c7c5"]);
        assert!(!analyzer.next());
    }

    #[test]
    fn test_illegal_click_clears_selection() {
        //! A non-destination click drops the selection
        let mut analyzer = offline();
        analyzer.click(Square::E2);
        assert!(analyzer.selection().is_selected());
        analyzer.click(Square::E6);
        assert!(!analyzer.selection().is_selected());
        assert!(analyzer.board().moves().is_empty());
    }

    #[test]
    fn test_analysis_text_and_bar_from_engine() {
        //! Engine output becomes "Score ... Best ..." and a bar value
        let engine = ScriptedEngine::new().with_evaluations([
            Evaluation {
                score: Score::Centipawns(20),
                pv: vec!["e2e4".into()],
            },
            Evaluation {
                score: Score::Centipawns(-50),
                pv: vec![],
            },
        ]);
        let mut analyzer = Analyzer::new(
            EngineLiaison::with_backend(Box::new(engine)),
            Duration::from_millis(100),
        );
        assert_eq!(analyzer.analysis_text(), "Score: 20  Best: e2e4");
        assert!((analyzer.eval_bar() - 0.6).abs() < 1e-6);

        analyzer.load_pgn_text("1. e4 *").unwrap();
        assert_eq!(analyzer.analysis_text(), "Score: -50");
        assert_eq!(analyzer.eval_bar(), 0.25);
    }
}
