//! External engine process
//!
//! [`UciEngine`] owns a child process speaking UCI over its standard streams.
//! A reader thread forwards every stdout line into a channel so that all waits
//! can be bounded by a deadline instead of blocking on the pipe.
//!
//! # Lifecycle
//!
//! 1. `spawn` starts the process and performs `uci`/`uciok` then
//!    `isready`/`readyok`, each bounded by the handshake timeout
//! 2. every request re-synchronises with `isready` before `position`/`go`
//! 3. dropping the engine sends `quit` and kills the process if it lingers

use crate::error::{EngineError, EngineResult};
use crate::protocol::{parse_bestmove, parse_info, Evaluation, InfoLine, Score};
use crate::EngineBackend;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Default bound on each handshake step
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Extra time granted past the move budget before `stop`, and again after it
pub const DEFAULT_SEARCH_GRACE: Duration = Duration::from_millis(1_500);

/// How long `quit` waits for a clean exit before killing
const QUIT_WAIT: Duration = Duration::from_secs(1);

/// Timeouts applied to an engine process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub handshake_timeout: Duration,
    pub search_grace: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            search_grace: DEFAULT_SEARCH_GRACE,
        }
    }
}

/// A running UCI engine
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    name: String,
    options: EngineOptions,
    closed: bool,
}

/// Outcome of one `go` command
struct SearchReport {
    best: Option<String>,
    last_info: Option<InfoLine>,
}

impl UciEngine {
    /// Start the executable at `path` and complete the UCI handshake
    pub fn spawn(path: &str, options: EngineOptions) -> EngineResult<Self> {
        Self::spawn_with_args(path, &[], options)
    }

    /// Start `program` with arguments and complete the UCI handshake
    pub fn spawn_with_args(
        program: &str,
        args: &[&str],
        options: EngineOptions,
    ) -> EngineResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                path: program.to_string(),
                source,
            })?;

        let stdin = child.stdin.take().ok_or(EngineError::Disconnected)?;
        let stdout = child.stdout.take().ok_or(EngineError::Disconnected)?;

        let (tx, rx) = crossbeam_channel::unbounded();
        thread::Builder::new()
            .name("uci-reader".to_string())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })?;

        let mut engine = Self {
            child,
            stdin,
            lines: rx,
            name: program.to_string(),
            options,
            closed: false,
        };

        if let Err(e) = engine.handshake() {
            engine.quit();
            return Err(e);
        }
        info!("[ENGINE] {} ready", engine.name);
        Ok(engine)
    }

    fn handshake(&mut self) -> EngineResult<()> {
        self.send("uci")?;
        let deadline = Instant::now() + self.options.handshake_timeout;
        loop {
            let line = self.recv_until(deadline).map_err(|e| match e {
                EngineError::Timeout(_) => EngineError::Handshake { expected: "uciok" },
                other => other,
            })?;
            if let Some(name) = line.strip_prefix("id name ") {
                self.name = name.trim().to_string();
            } else if line.trim() == "uciok" {
                break;
            }
        }
        self.send("ucinewgame")?;
        self.sync()
    }

    /// `isready` and wait for `readyok`, dropping any stale output
    fn sync(&mut self) -> EngineResult<()> {
        self.send("isready")?;
        let deadline = Instant::now() + self.options.handshake_timeout;
        loop {
            let line = self.recv_until(deadline).map_err(|e| match e {
                EngineError::Timeout(_) => EngineError::Handshake {
                    expected: "readyok",
                },
                other => other,
            })?;
            if line.trim() == "readyok" {
                return Ok(());
            }
        }
    }

    fn send(&mut self, command: &str) -> EngineResult<()> {
        debug!("[ENGINE] > {}", command);
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn recv_until(&self, deadline: Instant) -> EngineResult<String> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self.lines.recv_timeout(remaining) {
            Ok(line) => {
                debug!("[ENGINE] < {}", line);
                Ok(line)
            }
            Err(RecvTimeoutError::Timeout) => Err(EngineError::Timeout(remaining)),
            Err(RecvTimeoutError::Disconnected) => Err(EngineError::Disconnected),
        }
    }

    /// Run one `go movetime` search, stopping it if it overruns
    fn search(&mut self, fen: &str, budget: Duration) -> EngineResult<SearchReport> {
        self.sync()?;
        self.send(&format!("position fen {}", fen))?;
        self.send(&format!("go movetime {}", budget.as_millis().max(1)))?;

        let grace = self.options.search_grace;
        let mut deadline = Instant::now() + budget + grace;
        let mut stopped = false;
        let mut last_info: Option<InfoLine> = None;

        loop {
            let line = match self.recv_until(deadline) {
                Ok(line) => line,
                Err(EngineError::Timeout(_)) if !stopped => {
                    warn!("[ENGINE] Search overran {:?}, sending stop", budget);
                    self.send("stop")?;
                    stopped = true;
                    deadline = Instant::now() + grace;
                    continue;
                }
                Err(EngineError::Timeout(_)) => {
                    return Err(EngineError::Timeout(budget + grace + grace));
                }
                Err(e) => return Err(e),
            };

            if let Some(info) = parse_info(&line) {
                // Exact scores replace bounds; bounds only fill an empty slot
                if info.score.is_some() && (!info.bound || last_info.is_none()) {
                    last_info = Some(info);
                }
            } else if let Some(best) = parse_bestmove(&line) {
                return Ok(SearchReport { best, last_info });
            }
        }
    }

    /// Send `quit` and make sure the process is gone
    pub fn quit(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.send("quit");

        let deadline = Instant::now() + QUIT_WAIT;
        while Instant::now() < deadline {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => thread::sleep(Duration::from_millis(20)),
                Err(_) => break,
            }
        }
        warn!("[ENGINE] {} did not exit after quit, killing", self.name);
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl EngineBackend for UciEngine {
    fn best_move(&mut self, fen: &str, budget: Duration) -> EngineResult<String> {
        self.search(fen, budget)?
            .best
            .ok_or_else(|| EngineError::NoBestMove {
                fen: fen.to_string(),
            })
    }

    fn evaluate(&mut self, fen: &str, budget: Duration) -> EngineResult<Evaluation> {
        let report = self.search(fen, budget)?;
        match (report.last_info, report.best) {
            (Some(info), best) => {
                let mut pv = info.pv;
                if pv.is_empty() {
                    pv.extend(best);
                }
                Ok(Evaluation {
                    score: info.score.unwrap_or(Score::Centipawns(0)),
                    pv,
                })
            }
            (None, Some(best)) => Ok(Evaluation {
                score: Score::Centipawns(0),
                pv: vec![best],
            }),
            (None, None) => Err(EngineError::NoBestMove {
                fen: fen.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        self.quit();
    }
}
