//! Cursor state management
//!
//! Handles cursor position, pending wrap and saved state.

use crate::cell::Pen;

/// Cursor visual style (DECSCUSR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// Block cursor (filled rectangle)
    #[default]
    Block,
    /// Underline cursor
    Underline,
    /// Vertical bar cursor
    Bar,
}

/// Cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
    /// Pending wrap: a glyph was written in the last column and the next
    /// printable character wraps to the following row
    pub pending_wrap: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move cursor to absolute position, clamping to bounds
    pub fn move_to(&mut self, row: usize, col: usize, max_row: usize, max_col: usize) {
        self.row = row.min(max_row.saturating_sub(1));
        self.col = col.min(max_col.saturating_sub(1));
        self.pending_wrap = false;
    }

    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
        self.pending_wrap = false;
    }

    pub fn move_right(&mut self, n: usize, max_col: usize) {
        self.col = (self.col + n).min(max_col.saturating_sub(1));
        self.pending_wrap = false;
    }

    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }
}

/// State stored by DECSC / restored by DECRC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedCursor {
    pub cursor: Cursor,
    pub pen: Pen,
    pub origin_mode: bool,
    pub autowrap: bool,
}
