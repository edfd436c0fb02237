//! Game over state tracking and result management
//!
//! Tracks end-game conditions (checkmate, draws by rule, time forfeit) and
//! provides methods for determining the outcome and displaying results.
//!
//! # Game Over Conditions
//!
//! ## Checkmate
//! - **WhiteWon**: Black is in check with no legal moves
//! - **BlackWon**: White is in check with no legal moves
//!
//! ## Draw Conditions
//! - **Stalemate**: Side to move has no legal moves but is NOT in check
//! - **InsufficientMaterial**: Neither player can deliver checkmate (e.g., K vs K)
//! - **SeventyFiveMoveRule**: 75 moves by each side without capture or pawn move
//! - **FivefoldRepetition**: The same position occurred five times
//!
//! ## Time Control
//! - **WhiteWonByTime**: Black's clock reached the limit
//! - **BlackWonByTime**: White's clock reached the limit
//!
//! # Integration
//!
//! Set by [`crate::game::session::GameSession`] after every move application
//! and every clock check. Once set, the session rejects move input until an
//! explicit reset or load.
//!
//! # Reference
//!
//! FIDE Laws of Chess: https://www.fide.com/FIDE/handbook/LawsOfChess.pdf
//! - Article 5: Checkmate, stalemate, draws
//! - Article 6: Time control violations
//! - Article 9.6: Automatic draws (fivefold repetition, 75-move rule)

use fenboard_rules::{BoardResult, Color, Termination};

/// The game's end state
///
/// Starts as `Playing` and transitions to a terminal state when the game ends.
/// All non-Playing states are terminal until the session is reset or loaded.
///
/// # Examples
///
/// ```rust,ignore
/// if let Some(result) = board.game_result() {
///     let outcome = GameOverState::from_board_result(result);
///     println!("{} ({})", outcome.message(), outcome.cause());
/// }
/// ```
#[derive(Default, Debug, PartialEq, Eq, Clone, Copy)]
pub enum GameOverState {
    /// Game is still in progress
    #[default]
    Playing,

    /// White won by checkmate
    WhiteWon,

    /// Black won by checkmate
    BlackWon,

    /// Draw by stalemate
    Stalemate,

    /// Draw by insufficient material
    InsufficientMaterial,

    /// Draw by the seventy-five-move rule
    SeventyFiveMoveRule,

    /// Draw by fivefold repetition
    FivefoldRepetition,

    /// White won on time
    WhiteWonByTime,

    /// Black won on time
    BlackWonByTime,
}

impl GameOverState {
    /// Map a terminal board result onto the outcome it records
    pub fn from_board_result(result: BoardResult) -> Self {
        match (result.termination, result.winner) {
            (Termination::Checkmate, Some(Color::White)) => GameOverState::WhiteWon,
            (Termination::Checkmate, _) => GameOverState::BlackWon,
            (Termination::Stalemate, _) => GameOverState::Stalemate,
            (Termination::InsufficientMaterial, _) => GameOverState::InsufficientMaterial,
            (Termination::SeventyFiveMoves, _) => GameOverState::SeventyFiveMoveRule,
            (Termination::FivefoldRepetition, _) => GameOverState::FivefoldRepetition,
        }
    }

    /// Outcome when `loser` runs out of time
    pub fn time_forfeit(loser: Color) -> Self {
        match loser {
            Color::White => GameOverState::BlackWonByTime,
            Color::Black => GameOverState::WhiteWonByTime,
        }
    }

    /// Check if the game has ended
    ///
    /// Returns `true` for any non-Playing state, indicating move input should
    /// be disabled and results should be displayed.
    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameOverState::Playing)
    }

    /// Short result line for the outcome overlay
    ///
    /// ```rust,ignore
    /// assert_eq!(GameOverState::BlackWonByTime.message(), "Black wins on time");
    /// ```
    pub fn message(&self) -> &'static str {
        match self {
            GameOverState::Playing => "Game in progress",
            GameOverState::WhiteWon => "White wins",
            GameOverState::BlackWon => "Black wins",
            GameOverState::WhiteWonByTime => "White wins on time",
            GameOverState::BlackWonByTime => "Black wins on time",
            _ => "Draw",
        }
    }

    /// What ended the game
    pub fn cause(&self) -> &'static str {
        match self {
            GameOverState::Playing => "in progress",
            GameOverState::WhiteWon | GameOverState::BlackWon => "checkmate",
            GameOverState::Stalemate => "stalemate",
            GameOverState::InsufficientMaterial => "insufficient material",
            GameOverState::SeventyFiveMoveRule => "seventy-five-move rule",
            GameOverState::FivefoldRepetition => "fivefold repetition",
            GameOverState::WhiteWonByTime | GameOverState::BlackWonByTime => "time forfeit",
        }
    }

    /// Get the winner of the game, if there is one
    ///
    /// - `Some(Color::White)` - White won (checkmate or timeout)
    /// - `Some(Color::Black)` - Black won (checkmate or timeout)
    /// - `None` - Draw or game still playing
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameOverState::WhiteWon | GameOverState::WhiteWonByTime => Some(Color::White),
            GameOverState::BlackWon | GameOverState::BlackWonByTime => Some(Color::Black),
            _ => None,
        }
    }

    /// Check if the game ended in a draw
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GameOverState::Stalemate
                | GameOverState::InsufficientMaterial
                | GameOverState::SeventyFiveMoveRule
                | GameOverState::FivefoldRepetition
        )
    }

    /// Check if the game ended by timeout
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            GameOverState::WhiteWonByTime | GameOverState::BlackWonByTime
        )
    }

    /// Check if the game ended by checkmate
    pub fn is_checkmate(&self) -> bool {
        matches!(self, GameOverState::WhiteWon | GameOverState::BlackWon)
    }

    /// PGN result token, `None` while the game is in progress
    pub fn pgn_result(&self) -> Option<&'static str> {
        if !self.is_game_over() {
            return None;
        }
        Some(match self.winner() {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        })
    }
}
