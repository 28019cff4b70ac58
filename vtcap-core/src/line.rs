//! Terminal line representation
//!
//! A line is a row of cells in the terminal grid plus its line metadata.

use crate::cell::{Cell, Pen};

/// A single line in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    cells: Vec<Cell>,
    /// This row continues the previous row (the previous row auto-wrapped)
    pub continuation: bool,
}

impl Line {
    /// Create a new line with the specified number of columns
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::new(); cols],
            continuation: false,
        }
    }

    /// Create a blank line carrying the erase colors of `pen`
    pub fn blank(cols: usize, pen: &Pen) -> Self {
        Self {
            cells: vec![Cell::blank(pen); cols],
            continuation: false,
        }
    }

    pub fn cols(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn get_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    /// Get cell at column, panics if out of bounds
    pub fn cell(&self, col: usize) -> &Cell {
        &self.cells[col]
    }

    /// Get mutable cell at column, panics if out of bounds
    pub fn cell_mut(&mut self, col: usize) -> &mut Cell {
        &mut self.cells[col]
    }

    /// Erase the whole line. The line no longer continues the previous one.
    pub fn clear(&mut self, pen: &Pen) {
        for cell in &mut self.cells {
            cell.clear(pen);
        }
        self.continuation = false;
    }

    /// Erase the cells in `start..end` without shifting
    pub fn erase(&mut self, start: usize, end: usize, pen: &Pen) {
        let end = end.min(self.cells.len());
        if start >= end {
            return;
        }
        for cell in &mut self.cells[start..end] {
            cell.clear(pen);
        }
        self.repair_wide();
    }

    /// Insert n blank cells at column, shifting cells right.
    /// Cells that shift past the end are lost.
    pub fn insert_cells(&mut self, col: usize, n: usize, pen: &Pen) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let n = n.min(len - col);
        self.cells.truncate(len - n);
        self.cells
            .splice(col..col, std::iter::repeat(Cell::blank(pen)).take(n));
        self.repair_wide();
    }

    /// Delete n cells at column, shifting cells left.
    /// New cells at the end are blank.
    pub fn delete_cells(&mut self, col: usize, n: usize, pen: &Pen) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let n = n.min(len - col);
        self.cells.drain(col..col + n);
        self.cells.resize(len, Cell::blank(pen));
        self.repair_wide();
    }

    /// Erase halves of wide characters that lost their partner through an
    /// overwrite, erase or shift.
    pub fn repair_wide(&mut self) {
        let len = self.cells.len();
        for i in 0..len {
            let orphan = match self.cells[i].width() {
                0 => i == 0 || self.cells[i - 1].width() != 2,
                2 => i + 1 >= len || self.cells[i + 1].width() != 0,
                _ => false,
            };
            if orphan {
                let pen = self.cells[i].pen;
                self.cells[i].clear(&pen);
            }
        }
    }

    /// Text content of the line with trailing blanks trimmed
    pub fn text(&self) -> String {
        let mut result = String::new();
        for cell in &self.cells {
            if cell.is_continuation() {
                continue;
            }
            if cell.chars().is_empty() {
                result.push(' ');
            } else {
                result.extend(cell.chars());
            }
        }
        result.trim_end().to_string()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
}
