//! JSON screen snapshots
//!
//! The layout is fixed byte for byte: drivers diff snapshots textually, so
//! field order, indentation and line breaks are part of the format.

use vtcap_core::{
    CursorShape, EventListener, MouseMode, Pen, ScreenCell, Terminal, UnderlineStyle,
};

use crate::color::format_color;
use crate::escape::{escape_chars, escape_str};
use crate::mirror::SessionState;

/// Schema version reported in every snapshot
pub const VERSION: u32 = 0;

/// Read access to the engine state a snapshot needs
pub trait TerminalView {
    /// (rows, cols)
    fn size(&self) -> (usize, usize);
    /// `attrs.reverse` has the screen-wide reverse flag XORed in
    fn cell(&self, row: usize, col: usize) -> Option<ScreenCell>;
    fn line_continuation(&self, row: usize) -> bool;
    fn pen(&self) -> Pen;
    /// (row, col)
    fn cursor_position(&self) -> (usize, usize);
}

impl<L: EventListener> TerminalView for Terminal<L> {
    fn size(&self) -> (usize, usize) {
        Terminal::size(self)
    }

    fn cell(&self, row: usize, col: usize) -> Option<ScreenCell> {
        Terminal::cell(self, row, col)
    }

    fn line_continuation(&self, row: usize) -> bool {
        Terminal::line_continuation(self, row)
    }

    fn pen(&self) -> Pen {
        Terminal::pen(self)
    }

    fn cursor_position(&self) -> (usize, usize) {
        Terminal::cursor_position(self)
    }
}

/// `capture:img` payload
pub fn capture_img(view: &impl TerminalView, global_reverse: bool) -> String {
    format!("{{\n{}}}\n", fragment(view, global_reverse))
}

/// `capture:all` payload: cursor, pen and session properties followed by the
/// screen fragment
pub fn capture_all(view: &impl TerminalView, state: &SessionState) -> String {
    let mut out = String::from("{\n");
    let (row, col) = view.cursor_position();
    out.push_str(&format!("  \"cursor_column\": {},\n  \"cursor_row\": {},\n", col, row));

    let sgr = pen_entries(&view.pen());
    if !sgr.is_empty() {
        out.push_str("  \"current_sgr_attr\": {");
        out.push_str(sgr.strip_suffix(',').unwrap_or(&sgr));
        out.push_str("  },\n");
    }

    if !state.cursor_visible {
        out.push_str("  \"cursor_visible\": false,\n");
    }
    out.push_str(&format!("  \"cursor_blink\": {},\n", state.cursor_blink));
    out.push_str(&format!("  \"cursor_shape\": \"{}\",\n", shape_name(state.cursor_shape)));
    if let Some(mode) = mouse_name(state.mouse) {
        out.push_str(&format!("  \"mouse_mode\": \"{}\",\n", mode));
    }
    if state.alt_screen {
        out.push_str("  \"alternate_screen\": true,\n");
    }
    if state.reverse {
        out.push_str("  \"inverse_screen\": true,\n");
    }
    if let Some(title) = &state.title {
        out.push_str(&format!("  \"title\": \"{}\",\n", escape_str(title)));
    }
    if let Some(icon_title) = &state.icon_title {
        out.push_str(&format!("  \"icon_title\": \"{}\",\n", escape_str(icon_title)));
    }

    out.push_str(&fragment(view, state.reverse));
    out.push('}');
    out
}

/// Object body shared by both captures: size, version, optional `errors`,
/// `cells` and optional `lines`.
pub fn fragment(view: &impl TerminalView, global_reverse: bool) -> String {
    let (height, width) = view.size();
    let mut errors = String::new();
    let mut cells = String::from("\"cells\":[\n");
    let mut lines = Vec::new();
    // Byte offset of the separator after the last emitted cell
    let mut last_separator = None;

    for y in 0..height {
        if y + 1 < height && view.line_continuation(y + 1) {
            lines.push(format!("    \"{}\": {{ \"soft_wrapped\": true }}", y));
        }

        let mut x = 0;
        while x < width {
            let Some(cell) = view.cell(y, x) else {
                break;
            };
            if cell.is_continuation() {
                errors.push_str(&format!("unexpected Continuation cell at {},{};", x, y));
                x += 1;
                continue;
            }
            write_cell(&mut cells, x, y, &cell, global_reverse);
            last_separator = Some(cells.len());
            cells.push_str(",\n");
            x += usize::from(cell.width.max(1));
        }
        cells.push('\n');
    }
    if let Some(offset) = last_separator {
        cells.remove(offset);
    }
    cells.push(']');

    let mut out = format!(
        "  \"width\": {}, \"height\": {}, \"version\": {}, ",
        width, height, VERSION
    );
    if !errors.is_empty() {
        log::warn!("Snapshot anomalies: {}", errors);
        out.push_str(&format!("\n  \"errors\": \"{}\",\n", escape_str(&errors)));
    }
    out.push_str(&cells);
    if !lines.is_empty() {
        out.push_str(",\n  \"lines\": {");
        out.push_str(&lines.join(",\n"));
        out.push_str("\n  }");
    }
    out
}

fn write_cell(out: &mut String, x: usize, y: usize, cell: &ScreenCell, global_reverse: bool) {
    out.push_str(&format!("    {{\"x\": {}, \"y\": {},\n     \"t\": \"", x, y));
    if cell.chars.is_empty() {
        out.push_str(" \", \"cleared\": true");
    } else {
        out.push_str(&escape_chars(cell.chars.iter().copied()));
        out.push('"');
    }
    if cell.width != 1 {
        out.push_str(&format!(", \"width\": {}", cell.width));
    }

    let attrs = &cell.attrs;
    if let Some(fg) = format_color(attrs.fg) {
        out.push_str(&format!(", \"fg\": \"{}\"", fg));
    }
    if let Some(bg) = format_color(attrs.bg) {
        out.push_str(&format!(", \"bg\": \"{}\"", bg));
    }
    let flags = [
        ("bold", attrs.bold),
        ("italic", attrs.italic),
        ("blink", attrs.blink),
        ("inverse", attrs.reverse ^ global_reverse),
        ("strike", attrs.strike),
    ];
    for (name, set) in flags {
        if set {
            out.push_str(&format!(", \"{}\": true", name));
        }
    }
    if let Some(name) = underline_name(attrs.underline) {
        out.push_str(&format!(", \"{}\": true", name));
    }
    out.push('}');
}

/// Entries of `current_sgr_attr`, each `\n    "key": value,`
fn pen_entries(pen: &Pen) -> String {
    let mut out = String::new();
    let mut flag = |name: &str| {
        out.push_str(&format!("\n    \"{}\": true,", name));
    };
    if pen.bold {
        flag("bold");
    }
    if let Some(name) = underline_name(pen.underline) {
        flag(name);
    }
    if pen.italic {
        flag("italic");
    }
    if pen.blink {
        flag("blink");
    }
    if pen.reverse {
        flag("inverse");
    }
    if pen.strike {
        flag("strike");
    }
    if let Some(fg) = format_color(pen.fg) {
        out.push_str(&format!("\n    \"fg\": \"{}\",", fg));
    }
    if let Some(bg) = format_color(pen.bg) {
        out.push_str(&format!("\n    \"bg\": \"{}\",", bg));
    }
    out
}

fn underline_name(style: UnderlineStyle) -> Option<&'static str> {
    match style {
        UnderlineStyle::None => None,
        UnderlineStyle::Single => Some("underline"),
        UnderlineStyle::Double => Some("double_underline"),
        UnderlineStyle::Curly => Some("curly_underline"),
    }
}

fn shape_name(shape: CursorShape) -> &'static str {
    match shape {
        CursorShape::Block => "block",
        CursorShape::Underline => "underline",
        CursorShape::Bar => "bar",
    }
}

fn mouse_name(mode: MouseMode) -> Option<&'static str> {
    match mode {
        MouseMode::None => None,
        MouseMode::Click => Some("clicks"),
        MouseMode::Drag => Some("drag"),
        MouseMode::Movement => Some("movement"),
    }
}
