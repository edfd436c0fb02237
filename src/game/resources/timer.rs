//! Game clock for timed play
//!
//! Clocks count elapsed time per side, not time remaining. The side to move
//! accrues time from the moment it became their turn; nothing ticks in the
//! background. Stored totals change only at commit points (a move, a freeze),
//! and [`GameTimer::current`] adds the live delta on read.
//!
//! # Time Management
//!
//! - `commit` after every move charges the mover and resets the reference
//! - `freeze` when an outcome is recorded; reads then return stored totals
//! - `flagged` compares the live totals with the limit
//!
//! Every method takes the current instant explicitly so that callers (and
//! tests) decide what "now" is.

use fenboard_rules::Color;
use web_time::Instant;

/// Per-side elapsed time with an optional limit
#[derive(Debug, Clone)]
pub struct GameTimer {
    /// White's committed elapsed time in seconds
    pub white_elapsed: f64,
    /// Black's committed elapsed time in seconds
    pub black_elapsed: f64,
    /// Seconds each side may use; `None` for untimed play
    pub limit: Option<f64>,
    reference: Instant,
    started: Instant,
    frozen: bool,
}

impl GameTimer {
    pub fn new(limit: Option<f64>, now: Instant) -> Self {
        Self {
            white_elapsed: 0.0,
            black_elapsed: 0.0,
            limit,
            reference: now,
            started: now,
            frozen: false,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.limit.is_some()
    }

    fn live_delta(&self, now: Instant) -> f64 {
        if self.frozen || !self.is_timed() {
            return 0.0;
        }
        now.saturating_duration_since(self.reference).as_secs_f64()
    }

    /// Totals including the time `to_move` has been thinking since the last commit
    pub fn current(&self, now: Instant, to_move: Color) -> (f64, f64) {
        let delta = self.live_delta(now);
        match to_move {
            Color::White => (self.white_elapsed + delta, self.black_elapsed),
            Color::Black => (self.white_elapsed, self.black_elapsed + delta),
        }
    }

    /// Charge the elapsed delta to `mover` and restart the reference point
    pub fn commit(&mut self, now: Instant, mover: Color) {
        let delta = self.live_delta(now);
        match mover {
            Color::White => self.white_elapsed += delta,
            Color::Black => self.black_elapsed += delta,
        }
        self.reference = now;
    }

    /// Commit the live delta and stop accruing
    pub fn freeze(&mut self, now: Instant, to_move: Color) {
        self.commit(now, to_move);
        self.frozen = true;
    }

    /// Resume accruing from `now` with the stored totals
    pub fn resume(&mut self, now: Instant) {
        self.frozen = false;
        self.reference = now;
    }

    /// Replace both totals (load) and restart the reference point
    pub fn set_totals(&mut self, white: f64, black: f64, now: Instant) {
        self.white_elapsed = white.max(0.0);
        self.black_elapsed = black.max(0.0);
        self.resume(now);
    }

    /// Zero both clocks and restart the session timer
    pub fn restart(&mut self, now: Instant) {
        *self = Self::new(self.limit, now);
    }

    /// Side whose clock has reached the limit, White checked first
    pub fn flagged(&self, now: Instant, to_move: Color) -> Option<Color> {
        let limit = self.limit?;
        let (white, black) = self.current(now, to_move);
        if white >= limit {
            Some(Color::White)
        } else if black >= limit {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Remaining seconds per side, floored at zero; `None` when untimed
    pub fn remaining(&self, now: Instant, to_move: Color) -> Option<(f64, f64)> {
        let limit = self.limit?;
        let (white, black) = self.current(now, to_move);
        Some(((limit - white).max(0.0), (limit - black).max(0.0)))
    }

    /// Wall time since the session (or last restart) began
    pub fn session_elapsed(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.started).as_secs_f64()
    }
}
