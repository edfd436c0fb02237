//! Pawn promotion state for tracking pending promotions
//!
//! When a pawn move reaches the last rank without a piece choice, the move
//! is parked here instead of being applied. Ordinary move input is suspended
//! until a choice is supplied or the promotion is cancelled.

use fenboard_rules::{Color, Role, Square};

/// A pawn move waiting for its promotion piece
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PendingPromotion {
    /// Square the pawn moves from
    pub from: Option<Square>,
    /// Square on the last rank the pawn moves to
    pub to: Option<Square>,
    /// Color of the promoting pawn
    pub color: Option<Color>,
}

impl PendingPromotion {
    /// Park a promotion move until the piece is chosen
    pub fn start(&mut self, from: Square, to: Square, color: Color) {
        self.from = Some(from);
        self.to = Some(to);
        self.color = Some(color);
    }

    /// Clear the pending promotion (after the player selects or cancels)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some() && self.to.is_some()
    }

    /// Coordinate notation of the move completed with `role`
    pub fn notation(&self, role: Role) -> Option<String> {
        Some(format!("{}{}{}", self.from?, self.to?, role.char()))
    }
}

/// Whether `role` is a legal promotion choice
pub fn is_promotion_choice(role: Role) -> bool {
    matches!(role, Role::Queen | Role::Rook | Role::Bishop | Role::Knight)
}

/// Parse a promotion choice from its letter (`q`, `r`, `b`, `n`, any case)
pub fn parse_promotion_choice(letter: char) -> Option<Role> {
    Role::from_char(letter.to_ascii_lowercase()).filter(|role| is_promotion_choice(*role))
}
