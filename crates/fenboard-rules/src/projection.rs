//! Piece placement projection
//!
//! Turns the placement field of a FEN (`rnbqkbnr/pppppppp/8/...`) into a
//! square-to-glyph map a renderer can draw from. Rank 8 is the first FEN rank,
//! file a is the first character of each rank. Digits expand to that many empty
//! squares.

use crate::error::{RulesError, RulesResult};
use shakmaty::{File, Rank, Square};
use std::collections::BTreeMap;

/// Occupied squares and their FEN piece letters (uppercase white, lowercase black)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceMap(BTreeMap<Square, char>);

impl PieceMap {
    pub fn get(&self, square: Square) -> Option<char> {
        self.0.get(&square).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Square, char)> + '_ {
        self.0.iter().map(|(sq, glyph)| (*sq, *glyph))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Eight text rows from rank 8 down, `.` for empty squares
    pub fn to_rows(&self) -> Vec<String> {
        (0..8u32)
            .rev()
            .map(|rank| {
                (0..8u32)
                    .map(|file| {
                        let square = Square::from_coords(File::new(file), Rank::new(rank));
                        self.get(square).unwrap_or('.')
                    })
                    .collect()
            })
            .collect()
    }
}

/// Expand one FEN rank into eight cells, `None` for empty squares
pub fn expand_rank(rank: &str) -> RulesResult<[Option<char>; 8]> {
    let mut cells = [None; 8];
    let mut file = 0usize;
    for c in rank.chars() {
        if let Some(run) = c.to_digit(10) {
            if run == 0 || run > 8 {
                return Err(RulesError::InvalidPlacement {
                    reason: format!("bad empty-square count {:?} in rank {:?}", c, rank),
                });
            }
            file += run as usize;
        } else if "pnbrqkPNBRQK".contains(c) {
            if file < 8 {
                cells[file] = Some(c);
            }
            file += 1;
        } else {
            return Err(RulesError::InvalidPlacement {
                reason: format!("unexpected character {:?} in rank {:?}", c, rank),
            });
        }
        if file > 8 {
            break;
        }
    }
    if file != 8 {
        return Err(RulesError::InvalidPlacement {
            reason: format!("rank {:?} describes {} squares", rank, file),
        });
    }
    Ok(cells)
}

/// Project a placement field (or a full FEN, whose extra fields are ignored) onto squares
pub fn project_placement(placement: &str) -> RulesResult<PieceMap> {
    let field = placement.split_whitespace().next().unwrap_or_default();
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(RulesError::InvalidPlacement {
            reason: format!("expected 8 ranks, found {}", ranks.len()),
        });
    }

    let mut map = BTreeMap::new();
    for (row, rank_text) in ranks.iter().enumerate() {
        let rank = Rank::new(7 - row as u32);
        for (file, cell) in expand_rank(rank_text)?.iter().enumerate() {
            if let Some(glyph) = cell {
                map.insert(Square::from_coords(File::new(file as u32), rank), *glyph);
            }
        }
    }
    Ok(PieceMap(map))
}
