//! Engine liaison - the session's only path to the external engine
//!
//! Wraps an optional [`EngineBackend`]. The backend may be absent from the
//! start (binary not found) or dropped later (timeout, crash); either way the
//! liaison keeps answering with [`GameError::EngineUnavailable`] and a
//! placeholder status instead of failing the session.
//!
//! # Evaluation Bar
//!
//! [`eval_bar_value`] turns an engine score into a bar fill in `[0, 1]`:
//! the score is converted to White's point of view, divided by 100, clamped
//! to one pawn either way and mapped linearly (0 = Black winning, 1 = White).

use crate::game::error::{GameError, GameResult};
use fenboard_rules::Color;
use fenboard_uci::{EngineBackend, EngineOptions, Evaluation, Score, UciEngine, MATE_VALUE};
use std::time::Duration;
use tracing::{info, warn};

/// Status shown while no engine is connected
pub const ENGINE_MISSING: &str = "Engine not found";

/// Request/response access to an optional engine process
pub struct EngineLiaison {
    backend: Option<Box<dyn EngineBackend>>,
    status: String,
}

impl std::fmt::Debug for EngineLiaison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineLiaison")
            .field("connected", &self.backend.is_some())
            .field("status", &self.status)
            .finish()
    }
}

impl Default for EngineLiaison {
    fn default() -> Self {
        Self::disconnected()
    }
}

impl EngineLiaison {
    /// Liaison with no engine; every request fails with `EngineUnavailable`
    pub fn disconnected() -> Self {
        Self {
            backend: None,
            status: ENGINE_MISSING.to_string(),
        }
    }

    /// Wrap an already-running backend
    pub fn with_backend(backend: Box<dyn EngineBackend>) -> Self {
        let status = backend.name().to_string();
        Self {
            backend: Some(backend),
            status,
        }
    }

    /// Start the engine at `path`, falling back to a disconnected liaison
    pub fn connect(path: Option<&str>, options: EngineOptions) -> Self {
        let Some(path) = path else {
            info!("[ENGINE] No engine configured; engine features disabled");
            return Self::disconnected();
        };
        match UciEngine::spawn(path, options) {
            Ok(engine) => {
                info!("[ENGINE] Connected to {}", engine.name());
                Self::with_backend(Box::new(engine))
            }
            Err(e) => {
                warn!("[ENGINE] {}; engine features disabled", e);
                Self::disconnected()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Engine name while connected, placeholder text otherwise
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Best move for `fen` in coordinate notation
    pub fn best_move(&mut self, fen: &str, budget: Duration) -> GameResult<String> {
        let backend = self.backend_mut()?;
        let result = backend.best_move(fen, budget);
        self.settle(result)
    }

    /// Score (side to move's view) and principal variation for `fen`
    pub fn evaluate(&mut self, fen: &str, budget: Duration) -> GameResult<Evaluation> {
        let backend = self.backend_mut()?;
        let result = backend.evaluate(fen, budget);
        self.settle(result)
    }

    fn backend_mut(&mut self) -> GameResult<&mut Box<dyn EngineBackend>> {
        self.backend
            .as_mut()
            .ok_or_else(|| GameError::EngineUnavailable {
                reason: ENGINE_MISSING.to_string(),
            })
    }

    /// Drop the backend after any failure so later requests fail fast
    fn settle<T>(&mut self, result: fenboard_uci::EngineResult<T>) -> GameResult<T> {
        result.map_err(|e| {
            warn!("[ENGINE] Request failed: {}; disabling engine for this session", e);
            self.backend = None;
            self.status = ENGINE_MISSING.to_string();
            GameError::from(e)
        })
    }
}

/// Score converted to White's point of view
pub fn white_relative(score: Score, side_to_move: Color) -> Score {
    match side_to_move {
        Color::White => score,
        Color::Black => score.negate(),
    }
}

/// Evaluation bar fill in `[0, 1]`; 0.5 is level
pub fn eval_bar_value(score: Score, side_to_move: Color) -> f32 {
    let cp = white_relative(score, side_to_move).centipawns(MATE_VALUE);
    let pawns = (cp as f32 / 100.0).clamp(-1.0, 1.0);
    (pawns + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use fenboard_uci::{EngineError, ScriptedEngine};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_disconnected_liaison_reports_unavailable() {
        //! No engine means a placeholder and EngineUnavailable, never a panic
        let mut liaison = EngineLiaison::disconnected();
        assert!(!liaison.is_available());
        assert_eq!(liaison.status(), ENGINE_MISSING);
        let err = liaison
            .best_move(START_FEN, Duration::from_millis(10))
            .unwrap_err();
        assert!(matches!(err, GameError::EngineUnavailable { .. }));
    }

    #[test]
    fn test_missing_binary_connects_disconnected() {
        //! A bad engine path degrades instead of failing
        let liaison = EngineLiaison::connect(
            Some("/nonexistent/fenboard-engine"),
            EngineOptions::default(),
        );
        assert!(!liaison.is_available());
    }

    #[test]
    fn test_failure_disables_engine_for_session() {
        //! One failed request drops the backend for good
        let engine = ScriptedEngine::new()
            .with_failure(EngineError::Timeout(Duration::from_millis(10)))
            .with_moves(["e2e4"]);
        let mut liaison = EngineLiaison::with_backend(Box::new(engine));
        assert!(liaison.is_available());

        assert!(liaison.best_move(START_FEN, Duration::from_millis(10)).is_err());
        assert!(!liaison.is_available());
        assert_eq!(liaison.status(), ENGINE_MISSING);
        assert!(liaison.best_move(START_FEN, Duration::from_millis(10)).is_err());
    }

    #[test]
    fn test_eval_bar_mapping() {
        //! Level is half, a pawn or more saturates, Black's view is flipped
        assert_eq!(eval_bar_value(Score::Centipawns(0), Color::White), 0.5);
        assert_eq!(eval_bar_value(Score::Centipawns(50), Color::White), 0.75);
        assert_eq!(eval_bar_value(Score::Centipawns(400), Color::White), 1.0);
        assert_eq!(eval_bar_value(Score::Centipawns(-400), Color::White), 0.0);
        assert_eq!(eval_bar_value(Score::Centipawns(50), Color::Black), 0.25);
        assert_eq!(eval_bar_value(Score::Mate(2), Color::Black), 0.0);
        assert_eq!(eval_bar_value(Score::Mate(-1), Color::Black), 1.0);
    }
}
