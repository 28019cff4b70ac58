//! Color representation for terminal cells
//!
//! Supports:
//! - Default foreground/background
//! - 16 standard ANSI colors (0-15)
//! - 256-color palette (0-255)
//! - 24-bit true color (RGB)
//!
//! Named SGR colors (30-37, 90-97, ...) are stored as their palette index,
//! so `ESC[31m` and `ESC[38:5:1m` produce the same value.

/// Color representation supporting all terminal color modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// Indexed color (0-255)
    /// 0-7: standard colors
    /// 8-15: bright colors
    /// 16-231: 6x6x6 color cube
    /// 232-255: grayscale
    Indexed(u8),
    /// 24-bit RGB color
    Rgb { r: u8, g: u8, b: u8 },
}

impl Color {
    pub const BLACK: u8 = 0;
    pub const RED: u8 = 1;
    pub const GREEN: u8 = 2;
    pub const YELLOW: u8 = 3;
    pub const BLUE: u8 = 4;
    pub const MAGENTA: u8 = 5;
    pub const CYAN: u8 = 6;
    pub const WHITE: u8 = 7;

    /// Offset of the bright variants within the palette
    pub const BRIGHT: u8 = 8;

    pub fn indexed(index: u8) -> Self {
        Color::Indexed(index)
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// True when the color has not been set by SGR
    pub fn is_default(&self) -> bool {
        matches!(self, Color::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_default() {
        assert_eq!(Color::default(), Color::Default);
        assert!(Color::Default.is_default());
        assert!(!Color::indexed(0).is_default());
    }

    #[test]
    fn test_color_constructors() {
        assert_eq!(Color::indexed(Color::RED), Color::Indexed(1));
        assert_eq!(
            Color::rgb(1, 2, 3),
            Color::Rgb { r: 1, g: 2, b: 3 }
        );
        assert_eq!(
            Color::indexed(Color::BRIGHT + Color::WHITE),
            Color::Indexed(15)
        );
    }
}
