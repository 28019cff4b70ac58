//! Window size for PTY

/// Window size in characters and pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    /// Width in pixels, 0 when unknown
    pub pixel_width: u16,
    /// Height in pixels, 0 when unknown
    pub pixel_height: u16,
}

impl WindowSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    /// Convert to the libc structure used by openpty and TIOCGWINSZ
    pub fn to_winsize(self) -> libc::winsize {
        libc::winsize {
            ws_row: self.rows,
            ws_col: self.cols,
            ws_xpixel: self.pixel_width,
            ws_ypixel: self.pixel_height,
        }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl From<libc::winsize> for WindowSize {
    fn from(ws: libc::winsize) -> Self {
        Self {
            rows: ws.ws_row,
            cols: ws.ws_col,
            pixel_width: ws.ws_xpixel,
            pixel_height: ws.ws_ypixel,
        }
    }
}
