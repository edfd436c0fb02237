//! Game session controller
//!
//! [`GameSession`] owns the authoritative board and every piece of state
//! derived from it, and is the only place any of it is mutated. A front end
//! collects input for one frame, hands it to [`GameSession::tick`], then polls
//! [`GameSession::view`] to draw.
//!
//! # Tick Order
//!
//! 1. With an outcome recorded, only the outcome controls respond
//!    (close overlay, return to menu, export PGN)
//! 2. Otherwise the clock is checked for a time forfeit
//! 3. Events are routed: a pending promotion accepts only a piece choice or a
//!    cancel, clicks go through the selection state machine, commands run
//! 4. If it is the engine's turn and auto-play is on, one engine move is made
//!
//! # Selection State Machine
//!
//! ```text
//! Idle ──own piece──▶ PieceSelected ──legal target──▶ (move applied) Idle
//!  ▲                     │  │ same square / illegal target / cancel
//!  │                     │  └───────────────────────────────▶ Idle
//!  │                     └──promotion target──▶ AwaitingPromotionChoice
//!  └──────────── piece chosen (move applied) / cancel ◀────────┘
//! ```
//!
//! # Clocks
//!
//! Elapsed time is charged to the mover on every applied move and frozen when
//! an outcome is recorded. Engine moves are stamped after the search, so the
//! engine pays for its own thinking. Undo and [`GameSession::reset`] leave the totals
//! alone; the `Reset` command starts a new game with fresh clocks.

use crate::core::SessionSettings;
use crate::game::ai::{EngineLiaison, GameMode};
use crate::game::error::{GameError, GameResult};
use crate::game::events::{Command, InputEvent};
use crate::game::persistence::PersistedGameState;
use crate::game::resources::{
    is_promotion_choice, GameOverState, GameTimer, PendingPromotion, Selection,
};
use crate::game::view::SessionView;
use fenboard_rules::{
    export_pgn, project_placement, BoardAdapter, Color, PgnHeaders, PieceMap, Role, Square,
};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use web_time::Instant;

/// Per-game choices made at the launcher
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub mode: GameMode,
    /// Seconds per side; `None` for untimed play
    pub time_limit: Option<f64>,
    pub settings: SessionSettings,
}

/// The top-level orchestrator for one board
#[derive(Debug)]
pub struct GameSession {
    board: BoardAdapter,
    pieces: PieceMap,
    selection: Selection,
    promotion: PendingPromotion,
    timer: GameTimer,
    outcome: GameOverState,
    overlay_visible: bool,
    mode: GameMode,
    auto_play: bool,
    engine: EngineLiaison,
    settings: SessionSettings,
    show_history: bool,
    wants_menu: bool,
}

fn project(board: &BoardAdapter) -> PieceMap {
    project_placement(&board.board_fen()).unwrap_or_default()
}

impl GameSession {
    /// Start a game from the standard position at `now`
    ///
    /// Engine auto-play starts enabled when the mode has an engine side and
    /// the liaison is connected.
    pub fn new(config: SessionConfig, engine: EngineLiaison, now: Instant) -> Self {
        let auto_play = config.mode.engine_color().is_some() && engine.is_available();
        if config.mode.engine_color().is_some() && !auto_play {
            warn!("[GAME] Engine mode requested but no engine is available; playing hot-seat");
        }
        let board = BoardAdapter::new();
        info!(
            "[GAME] New session: {:?}, time limit {:?}",
            config.mode, config.time_limit
        );
        Self {
            pieces: project(&board),
            board,
            selection: Selection::default(),
            promotion: PendingPromotion::default(),
            timer: GameTimer::new(config.time_limit, now),
            outcome: GameOverState::Playing,
            overlay_visible: false,
            mode: config.mode,
            auto_play,
            engine,
            settings: config.settings,
            show_history: false,
            wants_menu: false,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn board(&self) -> &BoardAdapter {
        &self.board
    }

    pub fn pieces(&self) -> &PieceMap {
        &self.pieces
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn pending_promotion(&self) -> &PendingPromotion {
        &self.promotion
    }

    pub fn outcome(&self) -> GameOverState {
        self.outcome
    }

    pub fn outcome_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn auto_play(&self) -> bool {
        self.auto_play
    }

    pub fn engine_status(&self) -> &str {
        self.engine.status()
    }

    pub fn timer(&self) -> &GameTimer {
        &self.timer
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn wants_menu(&self) -> bool {
        self.wants_menu
    }

    pub fn history_visible(&self) -> bool {
        self.show_history
    }

    /// Whether the engine should move now
    pub fn is_engine_turn(&self) -> bool {
        self.auto_play && self.mode.engine_color() == Some(self.board.turn())
    }

    // ------------------------------------------------------------------
    // Per-tick routine
    // ------------------------------------------------------------------

    /// Process one frame's input at `now`
    pub fn tick<I>(&mut self, now: Instant, events: I)
    where
        I: IntoIterator<Item = InputEvent>,
    {
        for event in events {
            self.check_time(now);
            if self.outcome.is_game_over() {
                self.handle_outcome_event(event, now);
                continue;
            }
            if let Err(e) = self.handle_event(event, now) {
                debug!("[GAME] {:?} had no effect: {}", event, e);
            }
        }

        self.check_time(now);
        if !self.outcome.is_game_over() && !self.promotion.is_active() && self.is_engine_turn() {
            if let Err(e) = self.play_engine_move(now) {
                warn!("[ENGINE] No engine move: {}", e);
            }
        }
    }

    fn handle_event(&mut self, event: InputEvent, now: Instant) -> GameResult<()> {
        match event {
            InputEvent::Click(square) => self.click(square, now),
            InputEvent::RightClick => {
                self.cancel();
                Ok(())
            }
            InputEvent::Promote(role) => self.choose_promotion(role, now),
            InputEvent::Command(command) => self.handle_command(command, now),
        }
    }

    fn handle_command(&mut self, command: Command, now: Instant) -> GameResult<()> {
        match command {
            Command::Undo => self.undo(now).map(|_| ()),
            Command::Reset => {
                self.new_game(now);
                Ok(())
            }
            Command::Save => self.save(now),
            Command::Load => self.load(now).map(|_| ()),
            Command::ExportPgn => self.export_pgn_file(),
            Command::ToggleHistory => {
                self.show_history = !self.show_history;
                Ok(())
            }
            Command::ToggleAutoPlay => self.toggle_auto_play(),
            Command::CloseOutcome => {
                self.overlay_visible = false;
                Ok(())
            }
            Command::ReturnToMenu => {
                self.wants_menu = true;
                Ok(())
            }
            Command::Cancel => {
                self.cancel();
                Ok(())
            }
        }
    }

    /// Routing while an outcome is recorded
    ///
    /// The overlay answers only its own buttons. Once it is closed, file and
    /// view commands work again, but moves and undo stay rejected until a
    /// reset or load.
    fn handle_outcome_event(&mut self, event: InputEvent, now: Instant) {
        let InputEvent::Command(command) = event else {
            debug!("[GAME] Game over; ignoring {:?}", event);
            return;
        };
        let result = match command {
            Command::CloseOutcome | Command::ReturnToMenu | Command::ExportPgn => {
                self.handle_command(command, now)
            }
            Command::Reset | Command::Load | Command::Save | Command::ToggleHistory
                if !self.overlay_visible =>
            {
                self.handle_command(command, now)
            }
            other => {
                debug!("[GAME] Game over; ignoring {:?}", other);
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!("[GAME] {:?} failed: {}", command, e);
        }
    }

    // ------------------------------------------------------------------
    // Selection and moves
    // ------------------------------------------------------------------

    fn ensure_accepting_moves(&self) -> GameResult<()> {
        if self.outcome.is_game_over() {
            return Err(GameError::GameOver {
                message: self.outcome.message().to_string(),
            });
        }
        if self.promotion.is_active() {
            return Err(GameError::PromotionPending);
        }
        Ok(())
    }

    fn is_own_piece(&self, square: Square) -> bool {
        self.board
            .piece_at(square)
            .is_some_and(|piece| piece.color == self.board.turn())
    }

    fn select(&mut self, square: Square) {
        let destinations = self.board.legal_destinations(square);
        debug!(
            "[GAME] Selected {} with {} destinations",
            square,
            destinations.len()
        );
        self.selection.select(square, destinations);
    }

    /// Primary click on `square`
    pub fn click(&mut self, square: Square, now: Instant) -> GameResult<()> {
        self.ensure_accepting_moves()?;
        if self.is_engine_turn() {
            debug!("[GAME] Engine to move; click on {} ignored", square);
            return Ok(());
        }

        let Some(from) = self.selection.selected_square else {
            if self.is_own_piece(square) {
                self.select(square);
            }
            return Ok(());
        };

        if from == square {
            self.selection.clear();
            return Ok(());
        }

        if self.selection.allows(square) {
            let notation = format!("{}{}", from, square);
            if self.board.is_promotion(&notation) {
                let color = self.board.turn();
                self.selection.clear();
                self.promotion.start(from, square, color);
                info!("[PROMOTION] {:?} pawn {} awaiting piece choice", color, notation);
                return Ok(());
            }
            return self.apply_move(&notation, now);
        }

        if self.is_own_piece(square) {
            self.select(square);
            return Ok(());
        }

        self.selection.clear();
        Err(GameError::IllegalMove {
            notation: format!("{}{}", from, square),
        })
    }

    /// Complete a pending promotion with `role`
    pub fn choose_promotion(&mut self, role: Role, now: Instant) -> GameResult<()> {
        if self.outcome.is_game_over() {
            return Err(GameError::GameOver {
                message: self.outcome.message().to_string(),
            });
        }
        let notation = self
            .promotion
            .notation(role)
            .filter(|_| is_promotion_choice(role))
            .ok_or_else(|| GameError::IllegalMove {
                notation: format!("promotion to {:?}", role),
            })?;

        let mover = self.board.turn();
        match self.board.apply(&notation) {
            Ok(_) => {
                info!("[PROMOTION] {:?} promoted with {}", mover, notation);
                self.after_move(mover, now);
                Ok(())
            }
            Err(e) => {
                warn!("[PROMOTION] {} rejected: {}", notation, e);
                self.promotion.clear();
                Err(e.into())
            }
        }
    }

    /// Drop the selection and any pending promotion
    pub fn cancel(&mut self) {
        if self.promotion.is_active() {
            info!("[PROMOTION] Promotion cancelled");
        }
        self.promotion.clear();
        self.selection.clear();
    }

    /// Validate and apply a coordinate move for the side to move
    pub fn apply_move(&mut self, notation: &str, now: Instant) -> GameResult<()> {
        let mover = self.board.turn();
        if let Err(e) = self.board.apply(notation) {
            warn!("[GAME] Rejected {}: {}", notation, e);
            self.selection.clear();
            return Err(e.into());
        }
        self.after_move(mover, now);
        Ok(())
    }

    /// Bookkeeping after every applied move: clock, projection, outcome
    fn after_move(&mut self, mover: Color, now: Instant) {
        self.timer.commit(now, mover);
        self.selection.clear();
        self.promotion.clear();
        self.pieces = project(&self.board);
        if let Some(last) = self.board.moves().last() {
            info!(
                "[GAME] {:?} played {} (move {})",
                mover,
                last,
                self.board.moves().len()
            );
        }
        self.detect_board_outcome(now);
    }

    /// Ask the engine for a move and play it
    ///
    /// The search runs in wall time after `now`, so the move is stamped at
    /// `now` plus the search duration and the thinking is charged to the
    /// engine's clock. A search that overruns that clock loses on time.
    fn play_engine_move(&mut self, now: Instant) -> GameResult<()> {
        let fen = self.board.fen();
        let budget = self.settings.difficulty.move_budget();
        let started = Instant::now();
        let reply = match self.engine.best_move(&fen, budget) {
            Ok(reply) => reply,
            Err(e) => {
                self.auto_play = false;
                return Err(e);
            }
        };
        let moved_at = now + started.elapsed();

        self.check_time(moved_at);
        if self.outcome.is_game_over() {
            return Ok(());
        }

        let mover = self.board.turn();
        if let Err(e) = self.board.apply(&reply) {
            warn!("[ENGINE] Engine replied with illegal move {}: {}", reply, e);
            self.auto_play = false;
            return Err(e.into());
        }
        info!("[ENGINE] {} played {}", self.engine.status(), reply);
        self.after_move(mover, moved_at);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Outcome and clocks
    // ------------------------------------------------------------------

    fn detect_board_outcome(&mut self, now: Instant) {
        if let Some(result) = self.board.game_result() {
            self.record_outcome(GameOverState::from_board_result(result), now);
        }
    }

    /// Record a time forfeit if either clock reached the limit
    pub fn check_time(&mut self, now: Instant) {
        if self.outcome.is_game_over() {
            return;
        }
        if let Some(loser) = self.timer.flagged(now, self.board.turn()) {
            warn!("[TIMER] {:?} ran out of time", loser);
            self.record_outcome(GameOverState::time_forfeit(loser), now);
        }
    }

    fn record_outcome(&mut self, outcome: GameOverState, now: Instant) {
        self.timer.freeze(now, self.board.turn());
        self.outcome = outcome;
        self.overlay_visible = true;
        self.selection.clear();
        self.promotion.clear();
        info!("[GAME] Game over: {} ({})", outcome.message(), outcome.cause());
    }

    /// Clock totals including the live delta of the side to move
    pub fn current_clocks(&self, now: Instant) -> (f64, f64) {
        self.timer.current(now, self.board.turn())
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Take back the last move, or the last two when the engine is playing
    ///
    /// Returns how many plies were removed. Stops early without error when
    /// history runs out after the first.
    pub fn undo(&mut self, now: Instant) -> GameResult<usize> {
        if self.outcome.is_game_over() {
            return Err(GameError::GameOver {
                message: self.outcome.message().to_string(),
            });
        }
        self.cancel();
        self.timer.commit(now, self.board.turn());

        let plies = if self.auto_play { 2 } else { 1 };
        let mut popped = 0;
        for _ in 0..plies {
            if self.board.undo().is_err() {
                break;
            }
            popped += 1;
        }
        if popped == 0 {
            return Err(GameError::NoHistory);
        }
        self.pieces = project(&self.board);
        info!("[GAME] Undid {} ply(s); {:?} to move", popped, self.board.turn());
        Ok(popped)
    }

    /// Back to the initial position with an empty record
    ///
    /// Clocks and outcome are left as they are; see [`GameSession::new_game`].
    pub fn reset(&mut self) {
        self.board.reset();
        self.selection.clear();
        self.promotion.clear();
        self.pieces = project(&self.board);
        info!("[GAME] Board reset");
    }

    /// Reset the board, clear the outcome and restart both clocks
    pub fn new_game(&mut self, now: Instant) {
        self.reset();
        self.outcome = GameOverState::Playing;
        self.overlay_visible = false;
        self.wants_menu = false;
        self.timer.restart(now);
    }

    // ------------------------------------------------------------------
    // Engine play
    // ------------------------------------------------------------------

    /// Switch engine auto-play on or off
    ///
    /// Turning it on without a connected engine fails and leaves it off. In a
    /// hot-seat game the engine takes the side that is not to move.
    pub fn toggle_auto_play(&mut self) -> GameResult<()> {
        if self.auto_play {
            self.auto_play = false;
            info!("[ENGINE] Auto-play off");
            return Ok(());
        }
        if !self.engine.is_available() {
            warn!("[ENGINE] Cannot enable auto-play: {}", self.engine.status());
            return Err(GameError::EngineUnavailable {
                reason: self.engine.status().to_string(),
            });
        }
        if self.mode.engine_color().is_none() {
            self.mode = GameMode::VsEngine {
                engine_color: !self.board.turn(),
            };
        }
        self.auto_play = true;
        info!("[ENGINE] Auto-play on ({:?})", self.mode);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    /// Snapshot of the session at `now`
    pub fn snapshot(&self, now: Instant) -> PersistedGameState {
        let (white_clock, black_clock) = self.current_clocks(now);
        PersistedGameState {
            fen: self.board.fen(),
            white_clock,
            black_clock,
            bot: self.auto_play,
            moves: self.board.moves().to_vec(),
        }
    }

    /// Save to the configured save file
    pub fn save(&self, now: Instant) -> GameResult<()> {
        self.save_to(&self.settings.save_path, now)
    }

    pub fn save_to(&self, path: &Path, now: Instant) -> GameResult<()> {
        self.snapshot(now).write_to(path)
    }

    /// Load from the configured save file; `Ok(false)` when there is none
    pub fn load(&mut self, now: Instant) -> GameResult<bool> {
        let path = self.settings.save_path.clone();
        self.load_from(&path, now)
    }

    /// Replace the session with a saved game
    ///
    /// A missing file changes nothing and returns `Ok(false)`. A file that
    /// cannot be used returns `MalformedSave` and also changes nothing.
    pub fn load_from(&mut self, path: &Path, now: Instant) -> GameResult<bool> {
        let Some(state) = PersistedGameState::read_from(path)? else {
            return Ok(false);
        };
        let clocks_valid = [state.white_clock, state.black_clock]
            .iter()
            .all(|c| c.is_finite() && *c >= 0.0);
        if !clocks_valid {
            return Err(GameError::MalformedSave {
                reason: "clock values must be finite and non-negative".to_string(),
            });
        }
        let board = BoardAdapter::restore(&state.fen, &state.moves).map_err(|e| {
            GameError::MalformedSave {
                reason: e.to_string(),
            }
        })?;

        self.board = board;
        self.pieces = project(&self.board);
        self.selection.clear();
        self.promotion.clear();
        self.outcome = GameOverState::Playing;
        self.overlay_visible = false;
        self.timer
            .set_totals(state.white_clock, state.black_clock, now);

        if state.bot && !self.engine.is_available() {
            warn!("[SAVE] Saved game used the engine, but none is available");
        }
        self.auto_play = state.bot && self.engine.is_available();
        if self.auto_play && self.mode.engine_color().is_none() {
            self.mode = GameMode::VsEngine {
                engine_color: Color::Black,
            };
        }

        info!(
            "[SAVE] Loaded game from {:?} ({} moves)",
            path,
            self.board.moves().len()
        );
        self.detect_board_outcome(now);
        self.check_time(now);
        Ok(true)
    }

    /// PGN text of the game so far
    pub fn pgn_text(&self) -> String {
        let engine_name = self.engine.status().to_string();
        let (white, black) = match self.mode.engine_color() {
            Some(Color::White) => (engine_name, "Player".to_string()),
            Some(Color::Black) => ("Player".to_string(), engine_name),
            None => ("?".to_string(), "?".to_string()),
        };
        let headers = PgnHeaders {
            event: "Casual Game".to_string(),
            site: "fenboard".to_string(),
            round: "1".to_string(),
            white,
            black,
            ..PgnHeaders::default()
        };
        export_pgn(&self.board, &headers, self.outcome.pgn_result())
    }

    /// Write the PGN to the configured PGN file
    pub fn export_pgn_file(&self) -> GameResult<()> {
        self.export_pgn_to(&self.settings.pgn_path)
    }

    pub fn export_pgn_to(&self, path: &Path) -> GameResult<()> {
        fs::write(path, self.pgn_text())?;
        info!("[SAVE] Exported PGN to {:?}", path);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rendering-facing state
    // ------------------------------------------------------------------

    /// Checking pieces and the checked king
    pub fn check_squares(&self) -> Vec<Square> {
        if !self.board.is_check() {
            return Vec::new();
        }
        let mut squares = self.board.checkers();
        squares.extend(self.board.king_square(self.board.turn()));
        squares
    }

    /// `"Moves: N"` and the clock line
    pub fn sidebar_lines(&self, now: Instant) -> Vec<String> {
        let moves = format!("Moves: {}", self.board.moves().len());
        let clock = match self.timer.remaining(now, self.board.turn()) {
            Some((white, black)) => format!(
                "W: {}s  B: {}s",
                white.floor() as u64,
                black.floor() as u64
            ),
            None => format!("Time: {}s", self.timer.session_elapsed(now).floor() as u64),
        };
        vec![moves, clock]
    }

    /// Move record joined by spaces
    pub fn history_text(&self) -> String {
        self.board.moves().join(" ")
    }

    /// Overlay text, `None` while playing
    pub fn outcome_text(&self) -> Option<String> {
        if !self.outcome.is_game_over() {
            return None;
        }
        Some(if self.outcome.is_timeout() {
            self.outcome.message().to_string()
        } else {
            format!("{} by {}", self.outcome.message(), self.outcome.cause())
        })
    }

    /// Everything a renderer needs for one frame
    pub fn view(&self, now: Instant) -> SessionView {
        SessionView {
            pieces: self.pieces.clone(),
            side_to_move: self.board.turn(),
            selected: self.selection.selected_square,
            destinations: self.selection.possible_moves.clone(),
            check_squares: self.check_squares(),
            promotion: self.promotion.from.zip(self.promotion.to),
            sidebar: self.sidebar_lines(now),
            history: self.show_history.then(|| self.history_text()),
            outcome: self.outcome_text(),
            outcome_visible: self.overlay_visible,
            engine_status: self.engine.status().to_string(),
            wants_menu: self.wants_menu,
        }
    }
}
