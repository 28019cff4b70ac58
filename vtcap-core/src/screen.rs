//! Screen state
//!
//! The screen owns the grids (primary and optional alternate), the cursor,
//! the current pen, mode flags, scroll region and tab stops. It implements the
//! editing operations invoked by escape sequences; it never talks to the
//! outside world, the terminal layer turns state changes into events.

use crate::cell::{char_width, Pen};
use crate::cursor::{Cursor, SavedCursor};
use crate::grid::Grid;
use crate::line::Line;
use crate::modes::Modes;

const DEFAULT_TAB_WIDTH: usize = 8;

#[derive(Debug, Clone)]
pub struct Screen {
    primary: Grid,
    alternate: Option<Grid>,
    using_alternate: bool,
    rows: usize,
    cols: usize,
    cursor: Cursor,
    pen: Pen,
    modes: Modes,
    /// Scroll region (top, bottom), 0-indexed inclusive
    scroll_region: (usize, usize),
    tab_stops: Vec<bool>,
    /// Saved cursor for the primary and the alternate screen
    saved: [Option<SavedCursor>; 2],
    /// Cell holding the last printed base character, target of combining marks
    last_glyph: Option<(usize, usize)>,
}

impl Screen {
    /// Create a screen of `rows` x `cols`. Zero sizes are bumped to one.
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            primary: Grid::new(rows, cols),
            alternate: None,
            using_alternate: false,
            rows,
            cols,
            cursor: Cursor::new(),
            pen: Pen::default(),
            modes: Modes::new(),
            scroll_region: (0, rows - 1),
            tab_stops: default_tab_stops(cols),
            saved: [None, None],
            last_glyph: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The grid currently displayed
    pub fn grid(&self) -> &Grid {
        match (&self.alternate, self.using_alternate) {
            (Some(alt), true) => alt,
            _ => &self.primary,
        }
    }

    fn grid_mut(&mut self) -> &mut Grid {
        match (&mut self.alternate, self.using_alternate) {
            (Some(alt), true) => alt,
            _ => &mut self.primary,
        }
    }

    /// Get line at row of the displayed grid, panics if out of bounds
    pub fn line(&self, row: usize) -> &Line {
        self.grid().line(row)
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn pen(&self) -> &Pen {
        &self.pen
    }

    pub fn pen_mut(&mut self) -> &mut Pen {
        &mut self.pen
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut Modes {
        &mut self.modes
    }

    pub fn is_alternate_active(&self) -> bool {
        self.using_alternate
    }

    /// Forget the combining target; called for every non-printing action
    pub fn break_glyph(&mut self) {
        self.last_glyph = None;
    }

    /// Print a character at the cursor position
    pub fn print(&mut self, c: char) {
        let width = char_width(c);
        if width == 0 {
            if let Some((row, col)) = self.last_glyph {
                if self.grid_mut().line_mut(row).cell_mut(col).push_combining(c) {
                    return;
                }
                log::trace!("Combining mark dropped at {},{}", col, row);
                return;
            }
        }
        // A lone combining mark occupies a cell of its own; a wide character
        // on a one-column screen is clipped.
        let width = width.clamp(1, self.cols.min(2));

        if self.cursor.pending_wrap || self.cursor.col + width > self.cols {
            if self.modes.autowrap {
                self.index();
                self.cursor.col = 0;
                let row = self.cursor.row;
                self.grid_mut().line_mut(row).continuation = true;
            } else {
                self.cursor.col = self.cols - width;
            }
            self.cursor.pending_wrap = false;
        }

        let row = self.cursor.row;
        let col = self.cursor.col;
        let pen = self.pen;
        let insert = self.modes.insert;

        let line = self.grid_mut().line_mut(row);
        if insert {
            line.insert_cells(col, width, &pen);
        }
        line.cell_mut(col).set_char(c, width as u8, pen);
        if width == 2 {
            line.cell_mut(col + 1).set_continuation(pen);
        }
        line.repair_wide();
        self.last_glyph = Some((row, col));

        if col + width >= self.cols {
            self.cursor.col = self.cols - 1;
            self.cursor.pending_wrap = self.modes.autowrap;
        } else {
            self.cursor.col = col + width;
        }
    }

    /// Handle backspace (BS)
    pub fn backspace(&mut self) {
        self.cursor.move_left(1);
    }

    /// Handle horizontal tab (HT)
    pub fn tab(&mut self) {
        let mut col = self.cursor.col + 1;
        while col < self.cols && !self.tab_stops[col] {
            col += 1;
        }
        self.cursor.col = col.min(self.cols - 1);
        self.cursor.pending_wrap = false;
    }

    /// Handle carriage return (CR)
    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// Handle line feed (LF), vertical tab (VT), form feed (FF)
    pub fn linefeed(&mut self) {
        self.index();
        if self.modes.newline {
            self.cursor.col = 0;
        }
    }

    /// Handle index (IND) - move cursor down, scroll if at bottom margin
    pub fn index(&mut self) {
        let (_, bottom) = self.scroll_region;
        if self.cursor.row == bottom {
            self.scroll_up(1);
        } else if self.cursor.row + 1 < self.rows {
            self.cursor.row += 1;
        }
        self.cursor.pending_wrap = false;
    }

    /// Handle reverse index (RI) - move cursor up, scroll if at top margin
    pub fn reverse_index(&mut self) {
        let (top, _) = self.scroll_region;
        if self.cursor.row == top {
            self.scroll_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
        self.cursor.pending_wrap = false;
    }

    /// Handle next line (NEL) - move to start of next line
    pub fn next_line(&mut self) {
        self.index();
        self.cursor.col = 0;
    }

    /// Scroll up by n lines within scroll region
    pub fn scroll_up(&mut self, n: usize) {
        let (top, bottom) = self.scroll_region;
        let pen = self.pen;
        self.grid_mut().scroll_up(top, bottom, n, &pen);
    }

    /// Scroll down by n lines within scroll region
    pub fn scroll_down(&mut self, n: usize) {
        let (top, bottom) = self.scroll_region;
        let pen = self.pen;
        self.grid_mut().scroll_down(top, bottom, n, &pen);
    }

    /// Move cursor to position (1-indexed, as sent by CUP)
    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        self.set_cursor_row(row);
        self.set_cursor_col(col);
    }

    /// Move cursor up by n rows, stopping at the top margin when inside the region
    pub fn move_cursor_up(&mut self, n: usize) {
        let (top, _) = self.scroll_region;
        let min_row = if self.cursor.row >= top { top } else { 0 };
        self.cursor.row = self.cursor.row.saturating_sub(n).max(min_row);
        self.cursor.pending_wrap = false;
    }

    /// Move cursor down by n rows, stopping at the bottom margin when inside the region
    pub fn move_cursor_down(&mut self, n: usize) {
        let (_, bottom) = self.scroll_region;
        let max_row = if self.cursor.row <= bottom {
            bottom
        } else {
            self.rows - 1
        };
        self.cursor.row = (self.cursor.row + n).min(max_row);
        self.cursor.pending_wrap = false;
    }

    pub fn move_cursor_left(&mut self, n: usize) {
        self.cursor.move_left(n);
    }

    pub fn move_cursor_right(&mut self, n: usize) {
        self.cursor.move_right(n, self.cols);
    }

    /// Set cursor column (1-indexed)
    pub fn set_cursor_col(&mut self, col: usize) {
        self.cursor.col = col.saturating_sub(1).min(self.cols - 1);
        self.cursor.pending_wrap = false;
    }

    /// Set cursor row (1-indexed, relative to the scroll region in origin mode)
    pub fn set_cursor_row(&mut self, row: usize) {
        let row = row.saturating_sub(1);
        let (top, bottom) = self.scroll_region;
        self.cursor.row = if self.modes.origin {
            (top + row).min(bottom)
        } else {
            row.min(self.rows - 1)
        };
        self.cursor.pending_wrap = false;
    }

    /// Set top and bottom margins (DECSTBM, 1-indexed) and home the cursor
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let top = top.saturating_sub(1);
        let bottom = bottom.clamp(1, self.rows) - 1;
        if top >= bottom {
            log::debug!("Ignoring invalid scroll region {}..{}", top, bottom);
            return;
        }
        self.scroll_region = (top, bottom);
        self.move_cursor_to(1, 1);
    }

    /// Save cursor state (DECSC)
    pub fn save_cursor(&mut self) {
        let slot = usize::from(self.using_alternate);
        self.saved[slot] = Some(SavedCursor {
            cursor: self.cursor,
            pen: self.pen,
            origin_mode: self.modes.origin,
            autowrap: self.modes.autowrap,
        });
    }

    /// Restore cursor state (DECRC). Without a saved state the cursor goes home
    /// with a default pen.
    pub fn restore_cursor(&mut self) {
        let slot = usize::from(self.using_alternate);
        match self.saved[slot] {
            Some(saved) => {
                self.cursor = saved.cursor;
                self.pen = saved.pen;
                self.modes.origin = saved.origin_mode;
                self.modes.autowrap = saved.autowrap;
                self.cursor.row = self.cursor.row.min(self.rows - 1);
                self.cursor.col = self.cursor.col.min(self.cols - 1);
            }
            None => {
                self.cursor = Cursor::new();
                self.pen.reset();
                self.modes.origin = false;
            }
        }
    }

    /// Erase display (ED)
    pub fn erase_display(&mut self, mode: u16) {
        let pen = self.pen;
        let Cursor { row, col, .. } = self.cursor;
        let rows = self.rows;
        let cols = self.cols;
        let grid = self.grid_mut();

        match mode {
            0 => {
                if col == 0 {
                    grid.line_mut(row).clear(&pen);
                } else {
                    grid.line_mut(row).erase(col, cols, &pen);
                }
                for r in row + 1..rows {
                    grid.line_mut(r).clear(&pen);
                }
            }
            1 => {
                for r in 0..row {
                    grid.line_mut(r).clear(&pen);
                }
                grid.line_mut(row).erase(0, col + 1, &pen);
            }
            2 => grid.clear(&pen),
            3 => log::debug!("ED 3 ignored, there is no scrollback"),
            _ => log::debug!("Unknown ED mode: {}", mode),
        }
        self.cursor.pending_wrap = false;
    }

    /// Erase line (EL)
    pub fn erase_line(&mut self, mode: u16) {
        let pen = self.pen;
        let Cursor { row, col, .. } = self.cursor;
        let cols = self.cols;
        let line = self.grid_mut().line_mut(row);

        match mode {
            0 => line.erase(col, cols, &pen),
            1 => line.erase(0, col + 1, &pen),
            2 => line.clear(&pen),
            _ => log::debug!("Unknown EL mode: {}", mode),
        }
        self.cursor.pending_wrap = false;
    }

    /// Erase characters (ECH)
    pub fn erase_chars(&mut self, n: usize) {
        let pen = self.pen;
        let Cursor { row, col, .. } = self.cursor;
        self.grid_mut()
            .line_mut(row)
            .erase(col, col.saturating_add(n), &pen);
        self.cursor.pending_wrap = false;
    }

    /// Insert lines (IL)
    pub fn insert_lines(&mut self, n: usize) {
        let (top, bottom) = self.scroll_region;
        let row = self.cursor.row;
        if row < top || row > bottom {
            return;
        }
        let pen = self.pen;
        self.grid_mut().scroll_down(row, bottom, n, &pen);
        self.cursor.carriage_return();
    }

    /// Delete lines (DL)
    pub fn delete_lines(&mut self, n: usize) {
        let (top, bottom) = self.scroll_region;
        let row = self.cursor.row;
        if row < top || row > bottom {
            return;
        }
        let pen = self.pen;
        self.grid_mut().scroll_up(row, bottom, n, &pen);
        self.cursor.carriage_return();
    }

    /// Insert characters (ICH)
    pub fn insert_chars(&mut self, n: usize) {
        let pen = self.pen;
        let Cursor { row, col, .. } = self.cursor;
        self.grid_mut().line_mut(row).insert_cells(col, n, &pen);
        self.cursor.pending_wrap = false;
    }

    /// Delete characters (DCH)
    pub fn delete_chars(&mut self, n: usize) {
        let pen = self.pen;
        let Cursor { row, col, .. } = self.cursor;
        self.grid_mut().line_mut(row).delete_cells(col, n, &pen);
        self.cursor.pending_wrap = false;
    }

    /// Set tab stop at current column (HTS)
    pub fn set_tab_stop(&mut self) {
        let col = self.cursor.col;
        self.tab_stops[col] = true;
    }

    /// Clear tab stops (TBC)
    pub fn clear_tab_stop(&mut self, mode: u16) {
        match mode {
            0 => {
                let col = self.cursor.col;
                self.tab_stops[col] = false;
            }
            3 => self.tab_stops.iter_mut().for_each(|stop| *stop = false),
            _ => log::debug!("Unknown TBC mode: {}", mode),
        }
    }

    /// Allow or forbid switching to the alternate screen
    pub fn enable_alternate_screen(&mut self, enabled: bool) {
        if enabled {
            if self.alternate.is_none() {
                self.alternate = Some(Grid::new(self.rows, self.cols));
            }
        } else {
            self.using_alternate = false;
            self.alternate = None;
        }
    }

    /// Switch between primary and alternate screen. Entering clears the
    /// alternate grid. Returns false when alternate screen support is off.
    pub fn set_alternate_screen(&mut self, active: bool) -> bool {
        let pen = self.pen;
        let Some(alternate) = self.alternate.as_mut() else {
            return false;
        };
        if active && !self.using_alternate {
            alternate.clear(&pen);
        }
        self.using_alternate = active;
        self.last_glyph = None;
        true
    }

    /// Fill the screen with 'E' (DECALN)
    pub fn alignment_test(&mut self) {
        self.scroll_region = (0, self.rows - 1);
        let cols = self.cols;
        let grid = self.grid_mut();
        for r in 0..grid.rows() {
            let line = grid.line_mut(r);
            line.continuation = false;
            for c in 0..cols {
                line.cell_mut(c).set_char('E', 1, Pen::default());
            }
        }
        self.cursor = Cursor::new();
    }

    /// Reset to initial state, keeping the size and alternate screen support
    pub fn reset(&mut self) {
        let alternate_enabled = self.alternate.is_some();
        *self = Self::new(self.rows, self.cols);
        self.enable_alternate_screen(alternate_enabled);
    }
}

fn default_tab_stops(cols: usize) -> Vec<bool> {
    (0..cols).map(|c| c > 0 && c % DEFAULT_TAB_WIDTH == 0).collect()
}
