//! Selection state for tracking the selected piece

use fenboard_rules::{Destination, Square};

/// Currently selected square and where its piece can go
///
/// Non-empty only while a piece of the side to move sits on `selected_square`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    pub selected_square: Option<Square>,
    pub possible_moves: Vec<Destination>,
}

impl Selection {
    pub fn select(&mut self, square: Square, possible_moves: Vec<Destination>) {
        self.selected_square = Some(square);
        self.possible_moves = possible_moves;
    }

    pub fn clear(&mut self) {
        self.selected_square = None;
        self.possible_moves.clear();
    }

    pub fn is_selected(&self) -> bool {
        self.selected_square.is_some()
    }

    /// Whether `square` is one of the highlighted destinations
    pub fn allows(&self, square: Square) -> bool {
        self.possible_moves.iter().any(|d| d.to == square)
    }
}
