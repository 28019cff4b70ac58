//! JSON string bodies for glyphs and titles
//!
//! Printable ASCII other than `"` and `\` is copied, everything else is
//! written as `\uXXXX` escapes of its UTF-16 encoding. A NUL ends the input.

use std::fmt::Write;

/// Escape a sequence of code points (a cell's glyph)
pub fn escape_chars<I>(chars: I) -> String
where
    I: IntoIterator<Item = char>,
{
    let mut out = String::new();
    for c in chars {
        if c == '\0' {
            break;
        }
        push_escaped(&mut out, c);
    }
    out
}

/// Escape a string (window or icon title, diagnostics)
pub fn escape_str(text: &str) -> String {
    escape_chars(text.chars())
}

fn push_escaped(out: &mut String, c: char) {
    match c {
        '"' | '\\' => push_utf16(out, c),
        ' '..='~' => out.push(c),
        _ => push_utf16(out, c),
    }
}

fn push_utf16(out: &mut String, c: char) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        let _ = write!(out, "\\u{:04x}", unit);
    }
}
