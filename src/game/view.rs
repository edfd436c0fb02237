//! Polled rendering state
//!
//! A [`SessionView`] is an owned snapshot of everything a renderer draws in
//! one frame. It is rebuilt on demand from the session and never fed back.

use fenboard_rules::{Color, Destination, DestinationKind, PieceMap, Square};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub pieces: PieceMap,
    pub side_to_move: Color,
    pub selected: Option<Square>,
    pub destinations: Vec<Destination>,
    /// Checking pieces plus the checked king; empty when not in check
    pub check_squares: Vec<Square>,
    /// Source and destination of a pawn move awaiting its piece
    pub promotion: Option<(Square, Square)>,
    /// `"Moves: N"` then the clock line
    pub sidebar: Vec<String>,
    /// Space-separated move record, when the history view is on
    pub history: Option<String>,
    pub outcome: Option<String>,
    pub outcome_visible: bool,
    pub engine_status: String,
    pub wants_menu: bool,
}

impl SessionView {
    /// Plain-text board for terminal front ends
    ///
    /// `*` marks the selected square, `o`/`x` mark quiet and capture targets
    /// on empty squares, `!` marks squares involved in a check.
    pub fn to_text(&self) -> String {
        let mut rows = self.pieces.to_rows();
        for (index, row) in rows.iter_mut().enumerate() {
            let rank = 8 - index;
            let cells: String = row
                .chars()
                .enumerate()
                .map(|(file, glyph)| {
                    let name = format!("{}{}", (b'a' + file as u8) as char, rank);
                    self.marker(&name).unwrap_or(glyph)
                })
                .flat_map(|c| [c, ' '])
                .collect();
            *row = format!("{} {}", rank, cells.trim_end());
        }
        rows.push("  a b c d e f g h".to_string());

        let mut lines = rows;
        lines.push(format!("{:?} to move", self.side_to_move));
        lines.extend(self.sidebar.iter().cloned());
        if let Some((from, to)) = self.promotion {
            lines.push(format!("Promote {}{}: choose q, r, b or n", from, to));
        }
        if let Some(history) = &self.history {
            lines.push(format!("History: {}", history));
        }
        if self.outcome_visible {
            if let Some(outcome) = &self.outcome {
                lines.push(format!("*** {} ***", outcome));
            }
        }
        lines.push(format!("Engine: {}", self.engine_status));
        lines.join("\n")
    }

    fn marker(&self, name: &str) -> Option<char> {
        let square = Square::from_ascii(name.as_bytes()).ok()?;
        if self.selected == Some(square) {
            return Some('*');
        }
        if self.check_squares.contains(&square) {
            return Some('!');
        }
        if self.pieces.get(square).is_some() {
            return None;
        }
        self.destinations
            .iter()
            .find(|d| d.to == square)
            .map(|d| match d.kind {
                DestinationKind::Quiet => 'o',
                DestinationKind::Capture => 'x',
            })
    }
}
