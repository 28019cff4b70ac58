//! Canonical string form of cell and pen colors

use vtcap_core::Color;

/// xterm names of the 16 ANSI palette entries
pub const COLOR_NAMES: [&str; 16] = [
    "black",
    "red",
    "green",
    "yellow",
    "blue",
    "magenta",
    "cyan",
    "white",
    "bright black",
    "bright red",
    "bright green",
    "bright yellow",
    "bright blue",
    "bright magenta",
    "bright cyan",
    "bright white",
];

/// Format a color, `None` for the terminal default.
///
/// RGB colors become `#rrggbb` (lowercase), palette entries below 16 their
/// ANSI name and every other palette entry its decimal index.
pub fn format_color(color: Color) -> Option<String> {
    match color {
        Color::Default => None,
        Color::Rgb { r, g, b } => Some(format!("#{:02x}{:02x}{:02x}", r, g, b)),
        Color::Indexed(idx) => Some(
            COLOR_NAMES
                .get(usize::from(idx))
                .map_or_else(|| idx.to_string(), |name| (*name).to_string()),
        ),
    }
}
