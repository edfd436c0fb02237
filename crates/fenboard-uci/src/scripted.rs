//! In-memory engine with canned replies

use crate::error::{EngineError, EngineResult};
use crate::protocol::Evaluation;
use crate::EngineBackend;
use std::collections::VecDeque;
use std::time::Duration;

/// Backend that replays queued answers in order
///
/// Each call pops the next queued reply. An empty queue behaves like a dead
/// engine and returns [`EngineError::Disconnected`]. Every FEN it was asked
/// about is kept in `requests`. `with_think_time` makes each `best_move`
/// block for a fixed duration, like a real search.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    moves: VecDeque<EngineResult<String>>,
    evaluations: VecDeque<Evaluation>,
    think_time: Duration,
    pub requests: Vec<String>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for `best_move`
    pub fn with_moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves.extend(moves.into_iter().map(|m| Ok(m.into())));
        self
    }

    /// Queue a failure for the next `best_move`
    pub fn with_failure(mut self, error: EngineError) -> Self {
        self.moves.push_back(Err(error));
        self
    }

    /// Block every `best_move` for `think_time`
    pub fn with_think_time(mut self, think_time: Duration) -> Self {
        self.think_time = think_time;
        self
    }

    /// Queue replies for `evaluate`
    pub fn with_evaluations<I>(mut self, evaluations: I) -> Self
    where
        I: IntoIterator<Item = Evaluation>,
    {
        self.evaluations.extend(evaluations);
        self
    }
}

impl EngineBackend for ScriptedEngine {
    fn best_move(&mut self, fen: &str, _budget: Duration) -> EngineResult<String> {
        self.requests.push(fen.to_string());
        if !self.think_time.is_zero() {
            std::thread::sleep(self.think_time);
        }
        self.moves.pop_front().unwrap_or(Err(EngineError::Disconnected))
    }

    fn evaluate(&mut self, fen: &str, _budget: Duration) -> EngineResult<Evaluation> {
        self.requests.push(fen.to_string());
        self.evaluations.pop_front().ok_or(EngineError::Disconnected)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
