//! Board adapter - the authoritative position and its move record
//!
//! [`BoardAdapter`] owns the current `shakmaty::Chess` position together with
//! the ordered record of coordinate moves that produced it. Every mutating call
//! updates both or neither, so the record length always equals the number of
//! moves played since the last reset or load.
//!
//! # Promotion Policy
//!
//! A coordinate move without a promotion letter that carries a pawn onto its
//! last rank is not directly legal. [`BoardAdapter::is_legal`] answers the UI
//! question "can this pawn reach that square?" by re-checking with a queen
//! suffix, while [`BoardAdapter::apply`] insists on an explicit piece letter.
//!
//! # Undo Stack
//!
//! Positions are cheap to clone, so undo keeps the position that preceded each
//! move instead of reversing moves. A game restored from a save whose move list
//! cannot be replayed from the standard start keeps those moves in the record
//! as an inherited prefix that cannot be undone.

use crate::error::{RulesError, RulesResult};
use shakmaty::fen::Fen;
use shakmaty::uci::UciMove as Uci;
use shakmaty::{
    Bitboard, CastlingMode, Chess, Color, EnPassantMode, Move, Piece, Position, Rank, Role,
    Square,
};
use tracing::debug;

/// Halfmove clock value at which the seventy-five-move rule ends the game
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Occurrences of one position that end the game automatically
const FIVEFOLD: usize = 5;

/// Why the board reached a terminal position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
}

/// Terminal result read from the board alone (time is not the board's concern)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardResult {
    /// `None` for draws
    pub winner: Option<Color>,
    pub termination: Termination,
}

impl BoardResult {
    /// PGN result token for this result
    pub fn pgn_result(&self) -> &'static str {
        match self.winner {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }
}

/// How a reachable destination square should be highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    Quiet,
    /// Target square is occupied, or the move captures en passant
    Capture,
}

/// A square the selected piece can move to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Destination {
    pub to: Square,
    pub kind: DestinationKind,
}

/// Authoritative position plus the move record that produced it
#[derive(Debug, Clone)]
pub struct BoardAdapter {
    position: Chess,
    /// Position before each undoable move, oldest first
    undo_stack: Vec<Chess>,
    /// Coordinate moves; the first `record.len() - undo_stack.len()` are inherited
    record: Vec<String>,
}

impl Default for BoardAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardAdapter {
    /// Standard starting position with an empty move record
    pub fn new() -> Self {
        Self {
            position: Chess::default(),
            undo_stack: Vec::new(),
            record: Vec::new(),
        }
    }

    /// Start from an arbitrary position with an empty move record
    pub fn from_fen(fen: &str) -> RulesResult<Self> {
        Ok(Self {
            position: parse_fen(fen)?,
            undo_stack: Vec::new(),
            record: Vec::new(),
        })
    }

    /// Rebuild a board from a saved FEN and its move list
    ///
    /// When the moves replay from the standard start to exactly `fen`, the full
    /// history is restored and can be undone. Otherwise the FEN position becomes
    /// the root and the moves are kept as an inherited, non-undoable prefix.
    pub fn restore(fen: &str, moves: &[String]) -> RulesResult<Self> {
        let position = parse_fen(fen)?;
        let target = fen_of(&position);

        let mut replayed = Self::new();
        let replay_ok = moves.iter().all(|uci| replayed.apply(uci).is_ok());
        if replay_ok && replayed.fen() == target {
            debug!("[RULES] Restored {} moves with full undo history", moves.len());
            return Ok(replayed);
        }

        debug!(
            "[RULES] Save does not replay from the start position; keeping {} inherited moves",
            moves.len()
        );
        Ok(Self {
            position,
            undo_stack: Vec::new(),
            record: moves.to_vec(),
        })
    }

    /// The current position
    pub fn position(&self) -> &Chess {
        &self.position
    }

    /// Position at the root of the undoable history
    pub fn root_position(&self) -> &Chess {
        self.undo_stack.first().unwrap_or(&self.position)
    }

    /// Side to move
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    /// Full FEN of the current position
    pub fn fen(&self) -> String {
        fen_of(&self.position)
    }

    /// Piece placement field of the current FEN
    pub fn board_fen(&self) -> String {
        self.fen()
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Whole move record, inherited prefix included
    pub fn moves(&self) -> &[String] {
        &self.record
    }

    /// Moves that can be undone, oldest first
    pub fn undoable_moves(&self) -> &[String] {
        &self.record[self.inherited_len()..]
    }

    /// Number of recorded moves that precede the undoable history
    pub fn inherited_len(&self) -> usize {
        self.record.len() - self.undo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    /// Whether `notation` is a pawn move onto its last rank without a piece letter
    pub fn is_promotion(&self, notation: &str) -> bool {
        let Some((from, to, promotion)) = split_notation(notation) else {
            return false;
        };
        if promotion.is_some() {
            return false;
        }
        match self.piece_at(from) {
            Some(Piece {
                role: Role::Pawn,
                color: Color::White,
            }) => to.rank() == Rank::Eighth,
            Some(Piece {
                role: Role::Pawn,
                color: Color::Black,
            }) => to.rank() == Rank::First,
            _ => false,
        }
    }

    /// Whether the move can be played, treating bare promotions as queen promotions
    pub fn is_legal(&self, notation: &str) -> bool {
        self.reachable(notation).is_some()
    }

    /// Validate and play a coordinate move
    ///
    /// Bare promotions are rejected; the caller must supply the piece letter.
    /// On success the move is appended to the record in normalized notation.
    pub fn apply(&mut self, notation: &str) -> RulesResult<Move> {
        let m = self.resolve(notation)?;
        self.push(m.clone());
        Ok(m)
    }

    /// Play an already-resolved move (PGN import, engine replies)
    pub fn apply_move(&mut self, m: &Move) -> RulesResult<()> {
        if !self.position.is_legal(*m) {
            return Err(RulesError::IllegalMove {
                notation: move_notation(m),
            });
        }
        self.push(m.clone());
        Ok(())
    }

    /// Take back the most recent undoable move
    pub fn undo(&mut self) -> RulesResult<String> {
        let previous = self.undo_stack.pop().ok_or(RulesError::NoHistory)?;
        self.position = previous;
        let notation = self.record.pop().ok_or(RulesError::NoHistory)?;
        debug!("[RULES] Undid {}", notation);
        Ok(notation)
    }

    /// Back to the standard starting position with an empty record
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Every square the piece on `from` can reach, found by testing all 64 targets
    pub fn legal_destinations(&self, from: Square) -> Vec<Destination> {
        let mut destinations = Vec::new();
        for to in Bitboard::FULL {
            if to == from {
                continue;
            }
            let notation = format!("{}{}", from, to);
            if let Some(m) = self.reachable(&notation) {
                let kind = if self.piece_at(to).is_some() || m.is_en_passant() {
                    DestinationKind::Capture
                } else {
                    DestinationKind::Quiet
                };
                destinations.push(Destination { to, kind });
            }
        }
        destinations
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    /// Squares of the pieces giving check; empty when not in check
    pub fn checkers(&self) -> Vec<Square> {
        self.position.checkers().into_iter().collect()
    }

    /// Square of the king of `color`
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.position.board().king_of(color)
    }

    /// Terminal result of the current position, if the game is over
    pub fn game_result(&self) -> Option<BoardResult> {
        let turn = self.position.turn();
        if self.position.is_checkmate() {
            return Some(BoardResult {
                winner: Some(!turn),
                termination: Termination::Checkmate,
            });
        }
        let draw = |termination| Some(BoardResult {
            winner: None,
            termination,
        });
        if self.position.is_stalemate() {
            return draw(Termination::Stalemate);
        }
        if self.position.is_insufficient_material() {
            return draw(Termination::InsufficientMaterial);
        }
        if self.position.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
            return draw(Termination::SeventyFiveMoves);
        }
        if self.repetitions() >= FIVEFOLD {
            return draw(Termination::FivefoldRepetition);
        }
        None
    }

    pub fn is_game_over(&self) -> bool {
        self.game_result().is_some()
    }

    /// How often the current position has occurred in the undoable history
    fn repetitions(&self) -> usize {
        let key = repetition_key(&self.position);
        1 + self
            .undo_stack
            .iter()
            .filter(|earlier| repetition_key(earlier) == key)
            .count()
    }

    /// Legal move for `notation`, auto-queening bare promotions
    fn reachable(&self, notation: &str) -> Option<Move> {
        if self.is_promotion(notation) {
            self.resolve(&format!("{}q", notation.trim())).ok()
        } else {
            self.resolve(notation).ok()
        }
    }

    /// Strict conversion of coordinate notation into a legal move
    fn resolve(&self, notation: &str) -> RulesResult<Move> {
        let normalized = notation.trim().to_ascii_lowercase();
        let uci = Uci::from_ascii(normalized.as_bytes()).map_err(|_| {
            RulesError::InvalidNotation {
                notation: notation.to_string(),
            }
        })?;
        let m = uci
            .to_move(&self.position)
            .map_err(|_| RulesError::IllegalMove {
                notation: normalized.clone(),
            })?;
        Ok(m)
    }

    fn push(&mut self, m: Move) {
        let notation = move_notation(&m);
        self.undo_stack.push(self.position.clone());
        self.position.play_unchecked(m);
        debug!("[RULES] Played {}", notation);
        self.record.push(notation);
    }
}

/// Parse a full FEN into a standard chess position
pub fn parse_fen(fen: &str) -> RulesResult<Chess> {
    let invalid = |reason: String| RulesError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };
    let setup = Fen::from_ascii(fen.trim().as_bytes()).map_err(|e| invalid(e.to_string()))?;
    setup
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(e.to_string()))
}

/// Full FEN of a position
pub fn fen_of(position: &Chess) -> String {
    Fen::from_position(&position.clone(), EnPassantMode::Legal).to_string()
}

/// Coordinate notation of a move, castling written as the king's two-square step
pub fn move_notation(m: &Move) -> String {
    Uci::from_move(*m, CastlingMode::Standard).to_string()
}

/// Placement, side to move, castling and en passant: the fields that define a repetition
fn repetition_key(position: &Chess) -> String {
    fen_of(position)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Source, destination and optional promotion letter of a coordinate move
fn split_notation(notation: &str) -> Option<(Square, Square, Option<char>)> {
    let notation = notation.trim();
    if !notation.is_ascii() || !(4..=5).contains(&notation.len()) {
        return None;
    }
    let from = Square::from_ascii(notation[0..2].as_bytes()).ok()?;
    let to = Square::from_ascii(notation[2..4].as_bytes()).ok()?;
    let promotion = notation.chars().nth(4);
    Some((from, to, promotion))
}
