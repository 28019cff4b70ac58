//! Terminal grid
//!
//! The visible screen as a fixed number of lines. Lines scrolled off the
//! top of a region are discarded; there is no scrollback.

use crate::cell::Pen;
use crate::line::Line;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    lines: Vec<Line>,
    cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            lines: (0..rows).map(|_| Line::new(cols)).collect(),
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.lines.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get line at row, panics if out of bounds
    pub fn line(&self, row: usize) -> &Line {
        &self.lines[row]
    }

    /// Get mutable line at row, panics if out of bounds
    pub fn line_mut(&mut self, row: usize) -> &mut Line {
        &mut self.lines[row]
    }

    pub fn get_line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    /// Erase every line
    pub fn clear(&mut self, pen: &Pen) {
        for line in &mut self.lines {
            line.clear(pen);
        }
    }

    /// Scroll up: move lines in `top..=bottom` up by n, blank lines appear at
    /// the bottom of the region
    pub fn scroll_up(&mut self, top: usize, bottom: usize, n: usize, pen: &Pen) {
        if top > bottom || bottom >= self.rows() {
            return;
        }
        let n = n.min(bottom - top + 1);
        self.lines.drain(top..top + n);
        let blanks = (0..n).map(|_| Line::blank(self.cols, pen));
        let at = bottom + 1 - n;
        self.lines.splice(at..at, blanks);
    }

    /// Scroll down: move lines in `top..=bottom` down by n, blank lines appear
    /// at the top of the region
    pub fn scroll_down(&mut self, top: usize, bottom: usize, n: usize, pen: &Pen) {
        if top > bottom || bottom >= self.rows() {
            return;
        }
        let n = n.min(bottom - top + 1);
        self.lines.drain(bottom + 1 - n..=bottom);
        let blanks = (0..n).map(|_| Line::blank(self.cols, pen));
        self.lines.splice(top..top, blanks);
    }
}
