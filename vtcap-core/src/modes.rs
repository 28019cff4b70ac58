//! Terminal mode flags
//!
//! ANSI and DEC private modes that affect terminal behavior. The modes that
//! are visible to the embedding application (cursor, mouse, reverse video,
//! alternate screen) are reported through [`crate::Property`] by the terminal.

use crate::cursor::CursorShape;

/// Mouse reporting mode requested by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseMode {
    #[default]
    None,
    /// Button press/release (mode 1000)
    Click,
    /// Press/release plus motion while a button is held (mode 1002)
    Drag,
    /// All motion events (mode 1003)
    Movement,
}

/// Terminal mode flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modes {
    /// IRM - characters shift right instead of overwriting
    pub insert: bool,
    /// LNM - LF also does CR
    pub newline: bool,
    /// DECOM - cursor addressing relative to the scroll region
    pub origin: bool,
    /// DECAWM - auto-wrap at the right margin
    pub autowrap: bool,
    /// DECSCNM - whole-screen reverse video
    pub reverse: bool,
    /// DECTCEM
    pub cursor_visible: bool,
    /// Mode 12 / DECSCUSR
    pub cursor_blink: bool,
    pub cursor_shape: CursorShape,
    pub mouse: MouseMode,
}

impl Modes {
    pub fn new() -> Self {
        Self {
            insert: false,
            newline: false,
            origin: false,
            autowrap: true,
            reverse: false,
            cursor_visible: true,
            cursor_blink: true,
            cursor_shape: CursorShape::Block,
            mouse: MouseMode::None,
        }
    }

    /// Set an ANSI mode (SM/RM). Returns false for modes that are not tracked.
    pub fn set_mode(&mut self, mode: u16, value: bool) -> bool {
        match mode {
            4 => self.insert = value,
            20 => self.newline = value,
            _ => {
                log::debug!("Unknown ANSI mode: {}", mode);
                return false;
            }
        }
        true
    }
}

impl Default for Modes {
    fn default() -> Self {
        Self::new()
    }
}
