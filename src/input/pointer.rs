//! Board geometry for pointer input
//!
//! Maps window pixel coordinates onto board squares. The board is a square
//! rectangle of eight equal cells per side. With White at the bottom, file a
//! is the left column and rank 8 the top row; a flipped board mirrors both.
//!
//! # Example
//!
//! ```rust,ignore
//! let geometry = BoardGeometry::new(0.0, 0.0, 640.0);
//! if let Some(square) = geometry.square_at(cursor_x, cursor_y) {
//!     events.push(InputEvent::Click(square));
//! }
//! ```

use fenboard_rules::Square;
use shakmaty::{File, Rank};

/// Placement of the board inside the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardGeometry {
    /// Left edge in pixels
    pub origin_x: f32,
    /// Top edge in pixels
    pub origin_y: f32,
    /// Side length of the whole board in pixels
    pub size: f32,
    /// Black at the bottom
    pub flipped: bool,
}

impl BoardGeometry {
    pub fn new(origin_x: f32, origin_y: f32, size: f32) -> Self {
        Self {
            origin_x,
            origin_y,
            size,
            flipped: false,
        }
    }

    pub fn flipped(self) -> Self {
        Self {
            flipped: true,
            ..self
        }
    }

    pub fn square_size(&self) -> f32 {
        self.size / 8.0
    }

    /// Square under the pixel `(x, y)`, `None` outside the board
    pub fn square_at(&self, x: f32, y: f32) -> Option<Square> {
        let cell = self.square_size();
        if cell <= 0.0 {
            return None;
        }
        let column = ((x - self.origin_x) / cell).floor();
        let row = ((y - self.origin_y) / cell).floor();
        if !(0.0..8.0).contains(&column) || !(0.0..8.0).contains(&row) {
            return None;
        }
        let (column, row) = (column as u32, row as u32);
        let (file, rank) = if self.flipped {
            (7 - column, row)
        } else {
            (column, 7 - row)
        };
        Some(Square::from_coords(File::new(file), Rank::new(rank)))
    }

    /// Top-left pixel of `square`
    pub fn square_origin(&self, square: Square) -> (f32, f32) {
        let file = u32::from(square.file());
        let rank = u32::from(square.rank());
        let (column, row) = if self.flipped {
            (7 - file, rank)
        } else {
            (file, 7 - rank)
        };
        let cell = self.square_size();
        (
            self.origin_x + column as f32 * cell,
            self.origin_y + row as f32 * cell,
        )
    }
}
