//! UCI line parsing
//!
//! Only the two engine-to-GUI messages the driver acts on are understood:
//! `info ... score ... pv ...` during a search and the final `bestmove`.
//! Everything else (`id`, `option`, `info string`) is ignored.

use std::fmt;

/// Magnitude used when folding a mate score into centipawns
pub const MATE_VALUE: i32 = 10_000;

/// Engine score from the side to move's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Moves to mate; negative when the side to move is being mated
    Mate(i32),
}

impl Score {
    /// Single centipawn number; mates map just inside `±mate_value`
    ///
    /// Faster mates score higher: mate in 1 is `mate_value - 1`, being mated in
    /// 3 is `-mate_value + 3`. `Mate(0)` means the side to move is already mated.
    pub fn centipawns(self, mate_value: i32) -> i32 {
        match self {
            Score::Centipawns(cp) => cp,
            Score::Mate(n) if n > 0 => mate_value - n,
            Score::Mate(n) if n < 0 => -mate_value - n,
            Score::Mate(_) => -mate_value,
        }
    }

    /// Same score seen from the other side
    pub fn negate(self) -> Score {
        match self {
            Score::Centipawns(cp) => Score::Centipawns(-cp),
            Score::Mate(n) => Score::Mate(-n),
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "{}", cp),
            Score::Mate(n) => write!(f, "#{}", n),
        }
    }
}

/// Score and principal variation from the last complete `info` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub score: Score,
    /// Coordinate moves, first is the engine's preferred move
    pub pv: Vec<String>,
}

impl Evaluation {
    pub fn best_move(&self) -> Option<&str> {
        self.pv.first().map(String::as_str)
    }
}

/// What one `info` line says about the search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoLine {
    pub depth: Option<u32>,
    pub score: Option<Score>,
    /// Score is only a bound (`lowerbound`/`upperbound`)
    pub bound: bool,
    pub pv: Vec<String>,
}

/// Parse an `info` line; `None` for any other line or for `info string`
pub fn parse_info(line: &str) -> Option<InfoLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "info" {
        return None;
    }

    let mut info = InfoLine::default();
    while let Some(token) = tokens.next() {
        match token {
            "string" => return None,
            "depth" => info.depth = tokens.next().and_then(|v| v.parse().ok()),
            "score" => {
                let kind = tokens.next();
                let value = tokens.next().and_then(|v| v.parse::<i32>().ok());
                info.score = match (kind, value) {
                    (Some("cp"), Some(cp)) => Some(Score::Centipawns(cp)),
                    (Some("mate"), Some(n)) => Some(Score::Mate(n)),
                    _ => None,
                };
            }
            "lowerbound" | "upperbound" => info.bound = true,
            "pv" => {
                info.pv = tokens.by_ref().map(str::to_string).collect();
            }
            _ => {}
        }
    }
    Some(info)
}

/// Parse a `bestmove` line into the move, `None` inside for `(none)`/`0000`
pub fn parse_bestmove(line: &str) -> Option<Option<String>> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "bestmove" {
        return None;
    }
    match tokens.next() {
        Some("(none)") | Some("0000") | None => Some(None),
        Some(m) => Some(Some(m.to_string())),
    }
}
