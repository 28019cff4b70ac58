//! Terminal cell representation
//!
//! Each cell in the terminal grid contains:
//! - Zero or more code points (zero means the cell was erased)
//! - The pen that was active when it was written
//! - A display width: 1, 2 for the left half of a wide character,
//!   0 for the right half (the continuation slot)

use unicode_width::UnicodeWidthChar;

use crate::color::Color;

/// Maximum number of code points stored per cell (base + combining marks)
pub const MAX_CHARS_PER_CELL: usize = 6;

/// Underline style variants (SGR 4, 4:x, 21)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnderlineStyle {
    #[default]
    None,
    Single,
    Double,
    Curly,
}

/// Graphic rendition applied to newly written characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pen {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Bold text (SGR 1)
    pub bold: bool,
    /// Italic text (SGR 3)
    pub italic: bool,
    /// Underline style (SGR 4, 4:0-4:3, 21)
    pub underline: UnderlineStyle,
    /// Blinking text (SGR 5)
    pub blink: bool,
    /// Reverse video (SGR 7)
    pub reverse: bool,
    /// Strikethrough (SGR 9)
    pub strike: bool,
}

impl Pen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all attributes to default (SGR 0)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The rendition given to erased cells: colors survive, attributes do not.
    pub fn erase_pen(&self) -> Pen {
        Pen {
            fg: self.fg,
            bg: self.bg,
            ..Pen::default()
        }
    }
}

/// A single cell in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    chars: Vec<char>,
    pub pen: Pen,
    width: u8,
}

impl Cell {
    /// Create a new erased cell
    pub fn new() -> Self {
        Self {
            chars: Vec::new(),
            pen: Pen::default(),
            width: 1,
        }
    }

    /// Create an erased cell carrying the erase colors of `pen`
    pub fn blank(pen: &Pen) -> Self {
        Self {
            chars: Vec::new(),
            pen: pen.erase_pen(),
            width: 1,
        }
    }

    /// Store a base character, dropping whatever the cell held before
    pub fn set_char(&mut self, c: char, width: u8, pen: Pen) {
        self.chars.clear();
        self.chars.push(c);
        self.width = width;
        self.pen = pen;
    }

    /// Append a combining mark. Returns false if the cell is empty or full.
    pub fn push_combining(&mut self, c: char) -> bool {
        if self.chars.is_empty() || self.chars.len() >= MAX_CHARS_PER_CELL {
            return false;
        }
        self.chars.push(c);
        true
    }

    /// Turn this cell into the right half of a wide character
    pub fn set_continuation(&mut self, pen: Pen) {
        self.chars.clear();
        self.width = 0;
        self.pen = pen;
    }

    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Erase the cell using the erase colors of `pen`
    pub fn clear(&mut self, pen: &Pen) {
        self.chars.clear();
        self.width = 1;
        self.pen = pen.erase_pen();
    }

    /// Code points stored in the cell
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    /// True for cells that were erased and never written since
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty() && self.width == 1
    }

    /// First code point, or a space for erased cells
    pub fn display_char(&self) -> char {
        self.chars.first().copied().unwrap_or(' ')
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

/// Display width of a Unicode character: 0 for combining marks, 2 for wide
/// characters (CJK, emoji), 1 otherwise.
pub fn char_width(c: char) -> usize {
    match c.width() {
        Some(w) => w.min(2),
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_new() {
        let cell = Cell::new();
        assert!(cell.is_empty());
        assert_eq!(cell.width(), 1);
        assert_eq!(cell.display_char(), ' ');
    }

    #[test]
    fn test_cell_set_char() {
        let mut cell = Cell::new();
        let mut pen = Pen::new();
        pen.bold = true;
        cell.set_char('A', 1, pen);
        assert_eq!(cell.chars(), &['A']);
        assert!(cell.pen.bold);
        assert!(!cell.is_empty());
    }

    #[test]
    fn test_cell_combining_cap() {
        let mut cell = Cell::new();
        assert!(!cell.push_combining('\u{301}'));

        cell.set_char('e', 1, Pen::default());
        for _ in 1..MAX_CHARS_PER_CELL {
            assert!(cell.push_combining('\u{301}'));
        }
        assert!(!cell.push_combining('\u{301}'));
        assert_eq!(cell.chars().len(), MAX_CHARS_PER_CELL);
    }

    #[test]
    fn test_cell_clear_keeps_colors_only() {
        let mut pen = Pen::new();
        pen.fg = Color::Indexed(1);
        pen.bg = Color::Indexed(4);
        pen.bold = true;
        pen.underline = UnderlineStyle::Curly;

        let mut cell = Cell::new();
        cell.set_char('X', 1, pen);
        cell.clear(&pen);

        assert!(cell.is_empty());
        assert_eq!(cell.pen.fg, Color::Indexed(1));
        assert_eq!(cell.pen.bg, Color::Indexed(4));
        assert!(!cell.pen.bold);
        assert_eq!(cell.pen.underline, UnderlineStyle::None);
    }

    #[test]
    fn test_cell_continuation() {
        let mut cell = Cell::new();
        cell.set_continuation(Pen::default());
        assert!(cell.is_continuation());
        assert!(!cell.is_empty());
        assert!(cell.chars().is_empty());
    }

    #[test]
    fn test_char_width() {
        assert_eq!(char_width('a'), 1);
        assert_eq!(char_width('あ'), 2);
        assert_eq!(char_width('\u{301}'), 0);
    }

    #[test]
    fn test_pen_reset() {
        let mut pen = Pen::new();
        pen.bold = true;
        pen.italic = true;
        pen.fg = Color::Indexed(1);

        pen.reset();

        assert_eq!(pen, Pen::default());
    }
}
