//! Visual-mode selection.
//!
//! ## Learning: Normalize on Read
//!
//! A selection is stored exactly as the user made it: `start` is the anchor
//! (where `v` was pressed) and `end` follows the cursor, so `end` may well be
//! before `start`. Code that needs an ordered range asks for
//! [`Selection::normalized`] instead of every caller re-deriving it.

use crate::Position;
use serde::{Deserialize, Serialize};

/// An unordered selection between an anchor and the moving end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Anchor position
    pub start: Position,
    /// Moving end, follows the cursor
    pub end: Position,
}

impl Selection {
    /// Creates a new selection. No ordering is imposed.
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Creates a zero-width selection anchored at a position.
    pub fn anchored(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Returns `(earlier, later)`.
    pub fn normalized(&self) -> (Position, Position) {
        if self.end.is_before(&self.start) {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        }
    }

    /// Moves the free end of the selection.
    pub fn extend_to(&mut self, position: Position) {
        self.end = position;
    }

    /// Returns true if the selection spans multiple lines.
    pub fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }

    /// Returns true if a position lies inside the selection (inclusive).
    pub fn contains(&self, pos: Position) -> bool {
        let (start, end) = self.normalized();
        pos >= start && pos <= end
    }
}
