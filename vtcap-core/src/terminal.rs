//! Terminal state management
//!
//! Integrates the `vte` parser and the screen model. Sequences are applied to
//! the screen as they are parsed; property changes, replies and bells are
//! pushed synchronously to the [`EventListener`].

use crate::cell::{Pen, UnderlineStyle};
use crate::color::Color;
use crate::cursor::CursorShape;
use crate::event::{EventListener, Property};
use crate::modes::MouseMode;
use crate::policy::{Category, UnhandledPolicy};
use crate::screen::Screen;

/// Copy of a cell as seen by readers of the terminal.
///
/// `attrs.reverse` already has the screen-wide reverse video flag XORed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenCell {
    /// Code points, empty when the cell was erased
    pub chars: Vec<char>,
    /// 1, 2 for a wide character, 0 for the slot right of a wide character
    pub width: u8,
    pub attrs: Pen,
}

impl ScreenCell {
    pub fn is_continuation(&self) -> bool {
        self.width == 0
    }
}

/// Terminal emulator state
pub struct Terminal<L: EventListener> {
    parser: vte::Parser,
    performer: Performer<L>,
}

impl<L: EventListener> Terminal<L> {
    /// Create a terminal of `rows` x `cols`
    pub fn new(rows: usize, cols: usize, listener: L, policy: UnhandledPolicy) -> Self {
        Self {
            parser: vte::Parser::new(),
            performer: Performer {
                screen: Screen::new(rows, cols),
                listener,
                policy,
            },
        }
    }

    /// Feed bytes written by the application
    pub fn input_write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.parser.advance(&mut self.performer, *byte);
        }
    }

    /// Hard reset: screen, modes, pen and parser state return to their
    /// initial values. Cursor visibility, blink and shape are announced again.
    pub fn reset(&mut self) {
        self.parser = vte::Parser::new();
        self.performer.hard_reset();
    }

    /// Allow the application to switch to the alternate screen
    pub fn enable_alt_screen(&mut self, enabled: bool) {
        self.performer.screen.enable_alternate_screen(enabled);
    }

    /// (rows, cols)
    pub fn size(&self) -> (usize, usize) {
        (self.performer.screen.rows(), self.performer.screen.cols())
    }

    /// Cell at (row, col) of the displayed screen
    pub fn cell(&self, row: usize, col: usize) -> Option<ScreenCell> {
        let screen = &self.performer.screen;
        let cell = screen.grid().get_line(row)?.get(col)?;
        let mut attrs = cell.pen;
        attrs.reverse ^= screen.modes().reverse;
        Some(ScreenCell {
            chars: cell.chars().to_vec(),
            width: cell.width(),
            attrs,
        })
    }

    /// True when `row` continues the previous row after an auto-wrap
    pub fn line_continuation(&self, row: usize) -> bool {
        self.performer
            .screen
            .grid()
            .get_line(row)
            .is_some_and(|line| line.continuation)
    }

    /// Current pen (SGR state)
    pub fn pen(&self) -> Pen {
        *self.performer.screen.pen()
    }

    /// (row, col) of the cursor
    pub fn cursor_position(&self) -> (usize, usize) {
        let cursor = self.performer.screen.cursor();
        (cursor.row, cursor.col)
    }

    pub fn screen(&self) -> &Screen {
        &self.performer.screen
    }

    pub fn listener(&self) -> &L {
        &self.performer.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.performer.listener
    }
}

struct Performer<L: EventListener> {
    screen: Screen,
    listener: L,
    policy: UnhandledPolicy,
}

impl<L: EventListener> Performer<L> {
    fn emit(&mut self, property: Property) {
        log::trace!("Property {:?}", property);
        self.listener.property(property);
    }

    fn reply(&mut self, bytes: &[u8]) {
        log::debug!("Reply {:?}", String::from_utf8_lossy(bytes));
        self.listener.output(bytes);
    }

    fn hard_reset(&mut self) {
        let modes = self.screen.modes().clone();
        let was_alternate = self.screen.is_alternate_active();

        self.screen.reset();

        self.emit(Property::CursorVisible(true));
        self.emit(Property::CursorBlink(true));
        self.emit(Property::CursorShape(CursorShape::Block));
        if modes.reverse {
            self.emit(Property::Reverse(false));
        }
        if was_alternate {
            self.emit(Property::AltScreen(false));
        }
        if modes.mouse != MouseMode::None {
            self.emit(Property::Mouse(MouseMode::None));
        }
    }

    /// Handle C0 control characters
    fn handle_control(&mut self, byte: u8) {
        match byte {
            0x07 => {
                // BEL
                self.listener.bell();
            }
            0x08 => {
                // BS
                self.screen.backspace();
            }
            0x09 => {
                // HT
                self.screen.tab();
            }
            0x0A..=0x0C => {
                // LF, VT, FF
                self.screen.linefeed();
            }
            0x0D => {
                // CR
                self.screen.carriage_return();
            }
            _ => self
                .policy
                .unhandled(Category::Control, || format!("{:#04x}", byte)),
        }
    }

    /// Handle CSI sequences without intermediates
    fn handle_csi(&mut self, args: &[&[u16]], action: char) {
        let n = || arg(args, 0, 1) as usize;
        match action {
            '@' => {
                // ICH - Insert Character
                self.screen.insert_chars(n());
            }
            'A' => {
                // CUU - Cursor Up
                self.screen.move_cursor_up(n());
            }
            'B' => {
                // CUD - Cursor Down
                self.screen.move_cursor_down(n());
            }
            'C' | 'a' => {
                // CUF - Cursor Forward, HPR - Horizontal Position Relative
                self.screen.move_cursor_right(n());
            }
            'D' => {
                // CUB - Cursor Back
                self.screen.move_cursor_left(n());
            }
            'E' => {
                // CNL - Cursor Next Line
                self.screen.move_cursor_down(n());
                self.screen.carriage_return();
            }
            'F' => {
                // CPL - Cursor Previous Line
                self.screen.move_cursor_up(n());
                self.screen.carriage_return();
            }
            'G' | '`' => {
                // CHA - Cursor Horizontal Absolute, HPA
                self.screen.set_cursor_col(n());
            }
            'H' | 'f' => {
                // CUP/HVP - Cursor Position
                let row = arg(args, 0, 1) as usize;
                let col = arg(args, 1, 1) as usize;
                self.screen.move_cursor_to(row, col);
            }
            'J' => {
                // ED - Erase in Display
                self.screen.erase_display(arg(args, 0, 0));
            }
            'K' => {
                // EL - Erase in Line
                self.screen.erase_line(arg(args, 0, 0));
            }
            'L' => {
                // IL - Insert Line
                self.screen.insert_lines(n());
            }
            'M' => {
                // DL - Delete Line
                self.screen.delete_lines(n());
            }
            'P' => {
                // DCH - Delete Character
                self.screen.delete_chars(n());
            }
            'S' => {
                // SU - Scroll Up
                self.screen.scroll_up(n());
            }
            'T' => {
                // SD - Scroll Down
                self.screen.scroll_down(n());
            }
            'X' => {
                // ECH - Erase Character
                self.screen.erase_chars(n());
            }
            'c' if arg(args, 0, 0) == 0 => {
                // DA1 - Primary Device Attributes, VT100 with AVO
                self.reply(b"\x1b[?1;2c");
            }
            'd' => {
                // VPA - Vertical Position Absolute
                self.screen.set_cursor_row(n());
            }
            'e' => {
                // VPR - Vertical Position Relative
                self.screen.move_cursor_down(n());
            }
            'g' => {
                // TBC - Tab Clear
                self.screen.clear_tab_stop(arg(args, 0, 0));
            }
            'h' | 'l' => {
                // SM/RM - Set/Reset Mode
                let value = action == 'h';
                for group in args {
                    let mode = group.first().copied().unwrap_or(0);
                    if !self.screen.modes_mut().set_mode(mode, value) {
                        self.policy
                            .unhandled(Category::Csi, || format!("mode {} {}", mode, action));
                    }
                }
            }
            'm' => {
                // SGR - Select Graphic Rendition
                self.handle_sgr(args);
            }
            'n' => {
                // DSR - Device Status Report
                match arg(args, 0, 0) {
                    5 => self.reply(b"\x1b[0n"),
                    6 => {
                        let cursor = self.screen.cursor();
                        let response = format!("\x1b[{};{}R", cursor.row + 1, cursor.col + 1);
                        self.reply(response.as_bytes());
                    }
                    mode => self
                        .policy
                        .unhandled(Category::Csi, || format!("DSR {}", mode)),
                }
            }
            'r' => {
                // DECSTBM - Set Top and Bottom Margins
                let top = arg(args, 0, 1) as usize;
                let bottom = arg(args, 1, self.screen.rows() as u16) as usize;
                self.screen.set_scroll_region(top, bottom);
            }
            's' => {
                // SCOSC - Save cursor
                self.screen.save_cursor();
            }
            'u' => {
                // SCORC - Restore cursor
                self.screen.restore_cursor();
            }
            _ => self
                .policy
                .unhandled(Category::Csi, || format!("{:?} {}", args, action)),
        }
    }

    /// Set DEC private mode
    fn set_dec_mode(&mut self, mode: u16, value: bool) {
        match mode {
            1 | 1004 | 1005 | 1006 | 1015 | 2004 => {
                // Input encoding modes, nothing to track for output
                log::debug!("DEC mode {} = {} accepted", mode, value);
            }
            5 => {
                // DECSCNM - Reverse video
                self.screen.modes_mut().reverse = value;
                self.emit(Property::Reverse(value));
            }
            6 => {
                // DECOM - Origin Mode
                self.screen.modes_mut().origin = value;
                self.screen.move_cursor_to(1, 1);
            }
            7 => {
                // DECAWM - Auto-wrap Mode
                self.screen.modes_mut().autowrap = value;
            }
            12 => {
                // Cursor blink
                self.screen.modes_mut().cursor_blink = value;
                self.emit(Property::CursorBlink(value));
            }
            25 => {
                // DECTCEM - Text Cursor Enable Mode
                self.screen.modes_mut().cursor_visible = value;
                self.emit(Property::CursorVisible(value));
            }
            47 | 1047 => {
                // Alternate screen buffer
                if self.screen.set_alternate_screen(value) {
                    self.emit(Property::AltScreen(value));
                }
            }
            1048 => {
                // Save/restore cursor
                if value {
                    self.screen.save_cursor();
                } else {
                    self.screen.restore_cursor();
                }
            }
            1049 => {
                // Alternate screen buffer with cursor save/restore
                if value {
                    self.screen.save_cursor();
                    if self.screen.set_alternate_screen(true) {
                        self.emit(Property::AltScreen(true));
                    }
                } else {
                    if self.screen.set_alternate_screen(false) {
                        self.emit(Property::AltScreen(false));
                    }
                    self.screen.restore_cursor();
                }
            }
            1000 | 1002 | 1003 => {
                // Mouse tracking
                let mouse = match (value, mode) {
                    (false, _) => MouseMode::None,
                    (true, 1000) => MouseMode::Click,
                    (true, 1002) => MouseMode::Drag,
                    (true, _) => MouseMode::Movement,
                };
                self.screen.modes_mut().mouse = mouse;
                self.emit(Property::Mouse(mouse));
            }
            _ => self.policy.unhandled(Category::Csi, || {
                format!("DEC mode {} {}", mode, if value { 'h' } else { 'l' })
            }),
        }
    }

    /// DECSCUSR - Set Cursor Style
    fn set_cursor_style(&mut self, style: u16) {
        let (shape, blink) = match style {
            0 | 1 => (CursorShape::Block, true),
            2 => (CursorShape::Block, false),
            3 => (CursorShape::Underline, true),
            4 => (CursorShape::Underline, false),
            5 => (CursorShape::Bar, true),
            6 => (CursorShape::Bar, false),
            _ => {
                log::debug!("Unknown cursor style: {}", style);
                return;
            }
        };
        let modes = self.screen.modes_mut();
        modes.cursor_shape = shape;
        modes.cursor_blink = blink;
        self.emit(Property::CursorBlink(blink));
        self.emit(Property::CursorShape(shape));
    }

    /// Handle SGR (Select Graphic Rendition)
    fn handle_sgr(&mut self, args: &[&[u16]]) {
        let pen = self.screen.pen_mut();

        if args.is_empty() {
            pen.reset();
            return;
        }

        let mut i = 0;
        while i < args.len() {
            let group = args[i];
            let code = group.first().copied().unwrap_or(0);
            match code {
                0 => pen.reset(),
                1 => pen.bold = true,
                3 => pen.italic = true,
                4 => {
                    // 4:0 none, 4:1 single, 4:2 double, 4:3 curly
                    pen.underline = match group.get(1) {
                        Some(0) => UnderlineStyle::None,
                        Some(2) => UnderlineStyle::Double,
                        Some(3) => UnderlineStyle::Curly,
                        _ => UnderlineStyle::Single,
                    };
                }
                5 => pen.blink = true,
                7 => pen.reverse = true,
                9 => pen.strike = true,
                21 => pen.underline = UnderlineStyle::Double,
                22 => pen.bold = false,
                23 => pen.italic = false,
                24 => pen.underline = UnderlineStyle::None,
                25 => pen.blink = false,
                27 => pen.reverse = false,
                29 => pen.strike = false,
                30..=37 => pen.fg = Color::Indexed((code - 30) as u8),
                38 => {
                    if let Some(color) = extended_color(args, &mut i) {
                        pen.fg = color;
                    }
                }
                39 => pen.fg = Color::Default,
                40..=47 => pen.bg = Color::Indexed((code - 40) as u8),
                48 => {
                    if let Some(color) = extended_color(args, &mut i) {
                        pen.bg = color;
                    }
                }
                49 => pen.bg = Color::Default,
                58 => {
                    // Underline color, consumed but not tracked
                    extended_color(args, &mut i);
                }
                90..=97 => pen.fg = Color::Indexed((code - 90) as u8 + Color::BRIGHT),
                100..=107 => pen.bg = Color::Indexed((code - 100) as u8 + Color::BRIGHT),
                _ => log::debug!("Unknown SGR parameter: {}", code),
            }
            i += 1;
        }
    }

    /// Handle ESC sequences
    fn handle_esc(&mut self, intermediates: &[u8], byte: u8) {
        match (intermediates, byte) {
            ([], b'7') => self.screen.save_cursor(),
            ([], b'8') => self.screen.restore_cursor(),
            ([], b'D') => self.screen.index(),
            ([], b'E') => self.screen.next_line(),
            ([], b'H') => self.screen.set_tab_stop(),
            ([], b'M') => self.screen.reverse_index(),
            ([], b'c') => self.hard_reset(),
            // Keypad modes and the string terminator carry no screen state
            ([], b'=' | b'>' | b'\\') => {}
            ([b'#'], b'8') => self.screen.alignment_test(),
            ([b'(' | b')' | b'*' | b'+'], _) => {
                log::debug!("Charset designation {:?} ignored", byte as char);
            }
            _ => self.policy.unhandled(Category::Escape, || {
                format!("{:?} {}", intermediates, byte as char)
            }),
        }
    }

    /// Handle OSC sequences
    fn handle_osc(&mut self, params: &[&[u8]]) {
        let Some((command, rest)) = params.split_first() else {
            return;
        };
        let text = || String::from_utf8_lossy(&rest.join(&b';')).into_owned();
        match *command {
            b"0" => {
                let title = text();
                self.emit(Property::IconName(title.clone()));
                self.emit(Property::Title(title));
            }
            b"1" => self.emit(Property::IconName(text())),
            b"2" => self.emit(Property::Title(text())),
            _ => self.policy.unhandled(Category::Osc, || {
                format!("OSC {}", String::from_utf8_lossy(command))
            }),
        }
    }
}

impl<L: EventListener> vte::Perform for Performer<L> {
    fn print(&mut self, c: char) {
        self.screen.print(c);
    }

    fn execute(&mut self, byte: u8) {
        self.screen.break_glyph();
        self.handle_control(byte);
    }

    fn hook(&mut self, params: &vte::Params, intermediates: &[u8], _ignore: bool, action: char) {
        self.screen.break_glyph();
        self.policy.unhandled(Category::Dcs, || {
            let args: Vec<&[u16]> = params.iter().collect();
            format!("{:?} {:?} {}", args, intermediates, action)
        });
    }

    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        self.screen.break_glyph();
        self.handle_osc(params);
    }

    fn csi_dispatch(
        &mut self,
        params: &vte::Params,
        intermediates: &[u8],
        ignore: bool,
        action: char,
    ) {
        self.screen.break_glyph();
        let args: Vec<&[u16]> = params.iter().collect();
        if ignore {
            self.policy
                .unhandled(Category::Csi, || format!("oversized {:?} {}", args, action));
            return;
        }

        match (intermediates, action) {
            ([], _) => self.handle_csi(&args, action),
            ([b'?'], 'h' | 'l') => {
                // DECSET/DECRST
                let value = action == 'h';
                for group in &args {
                    self.set_dec_mode(group.first().copied().unwrap_or(0), value);
                }
            }
            ([b'?'], 'n') if arg(&args, 0, 0) == 6 => {
                // DECXCPR - Extended Cursor Position Report
                let cursor = self.screen.cursor();
                let response = format!("\x1b[?{};{}R", cursor.row + 1, cursor.col + 1);
                self.reply(response.as_bytes());
            }
            ([b'>'], 'c') => {
                // DA2 - Secondary Device Attributes
                self.reply(b"\x1b[>0;100;0c");
            }
            ([b' '], 'q') => {
                // DECSCUSR - Set Cursor Style
                self.set_cursor_style(arg(&args, 0, 0));
            }
            _ => self.policy.unhandled(Category::Csi, || {
                format!("{:?} {:?} {}", intermediates, args, action)
            }),
        }
    }

    fn esc_dispatch(&mut self, intermediates: &[u8], ignore: bool, byte: u8) {
        self.screen.break_glyph();
        if ignore {
            self.policy
                .unhandled(Category::Escape, || format!("oversized {}", byte as char));
            return;
        }
        self.handle_esc(intermediates, byte);
    }
}

/// Parameter `index` (first sub-parameter), with 0 or absent mapped to `default`
fn arg(args: &[&[u16]], index: usize, default: u16) -> u16 {
    match args.get(index).and_then(|group| group.first()) {
        Some(0) | None => default,
        Some(&value) => value,
    }
}

/// Parse an extended color (38/48/58) in either the `:` form (one group) or the
/// `;` form (several groups). `i` is advanced past consumed groups.
fn extended_color(args: &[&[u16]], i: &mut usize) -> Option<Color> {
    let group = args[*i];
    if group.len() > 1 {
        return match group[1..] {
            [5, index, ..] => Some(Color::Indexed(channel(index))),
            // code:2:colorspace:r:g:b
            [2, _, r, g, b, ..] => Some(Color::rgb(channel(r), channel(g), channel(b))),
            [2, r, g, b] => Some(Color::rgb(channel(r), channel(g), channel(b))),
            _ => None,
        };
    }

    let next = |offset: usize| args.get(*i + offset).and_then(|g| g.first()).copied();
    match next(1) {
        Some(5) => {
            let index = next(2)?;
            *i += 2;
            Some(Color::Indexed(channel(index)))
        }
        Some(2) => {
            let (r, g, b) = (next(2)?, next(3)?, next(4)?);
            *i += 4;
            Some(Color::rgb(channel(r), channel(g), channel(b)))
        }
        _ => None,
    }
}

fn channel(value: u16) -> u8 {
    value.min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Recorder;

    fn term() -> Terminal<Recorder> {
        let mut term = Terminal::new(24, 80, Recorder::default(), UnhandledPolicy::default());
        term.enable_alt_screen(true);
        term
    }

    fn text(term: &Terminal<Recorder>, row: usize) -> String {
        term.screen().line(row).text()
    }

    #[test]
    fn test_terminal_new() {
        let term = term();
        assert_eq!(term.size(), (24, 80));
        assert_eq!(term.cursor_position(), (0, 0));
    }

    #[test]
    fn test_terminal_print() {
        let mut term = term();
        term.input_write(b"Hello");

        assert_eq!(term.cursor_position(), (0, 5));
        assert_eq!(term.cell(0, 0).map(|c| c.chars), Some(vec!['H']));
        assert_eq!(term.cell(0, 5).map(|c| c.chars), Some(vec![]));
        assert!(term.cell(24, 0).is_none());
        assert!(term.cell(0, 80).is_none());
    }

    #[test]
    fn test_terminal_utf8_split_across_writes() {
        let mut term = term();
        let bytes = "aあ".as_bytes();
        term.input_write(&bytes[..2]);
        term.input_write(&bytes[2..]);

        let cell = term.cell(0, 1).unwrap();
        assert_eq!(cell.chars, vec!['あ']);
        assert_eq!(cell.width, 2);
        assert!(term.cell(0, 2).unwrap().is_continuation());
    }

    #[test]
    fn test_terminal_cursor_movement() {
        let mut term = term();
        term.input_write(b"\x1b[10;20H");
        assert_eq!(term.cursor_position(), (9, 19));

        term.input_write(b"\x1b[3A\x1b[2D");
        assert_eq!(term.cursor_position(), (6, 17));

        term.input_write(b"\x1b[H");
        assert_eq!(term.cursor_position(), (0, 0));
    }

    #[test]
    fn test_terminal_sgr() {
        let mut term = term();
        term.input_write(b"\x1b[1;31mR");

        let cell = term.cell(0, 0).unwrap();
        assert!(cell.attrs.bold);
        assert_eq!(cell.attrs.fg, Color::Indexed(1));

        term.input_write(b"\x1b[0m");
        assert_eq!(term.pen(), Pen::default());
    }

    #[test]
    fn test_terminal_sgr_extended_colors() {
        let mut term = term();
        term.input_write(b"\x1b[38:5:50m");
        assert_eq!(term.pen().fg, Color::Indexed(50));

        term.input_write(b"\x1b[38:2:23:12:255m");
        assert_eq!(term.pen().fg, Color::rgb(23, 12, 255));

        term.input_write(b"\x1b[48;2;1;2;3;1m");
        assert_eq!(term.pen().bg, Color::rgb(1, 2, 3));
        assert!(term.pen().bold);

        term.input_write(b"\x1b[48;5;200m");
        assert_eq!(term.pen().bg, Color::Indexed(200));

        term.input_write(b"\x1b[97;101m");
        assert_eq!(term.pen().fg, Color::Indexed(15));
        assert_eq!(term.pen().bg, Color::Indexed(9));
    }

    #[test]
    fn test_terminal_sgr_underline_styles() {
        let mut term = term();
        term.input_write(b"\x1b[4m");
        assert_eq!(term.pen().underline, UnderlineStyle::Single);
        term.input_write(b"\x1b[4:3m");
        assert_eq!(term.pen().underline, UnderlineStyle::Curly);
        term.input_write(b"\x1b[21m");
        assert_eq!(term.pen().underline, UnderlineStyle::Double);
        term.input_write(b"\x1b[4:0m");
        assert_eq!(term.pen().underline, UnderlineStyle::None);
        // 4;3 is underline plus italic, not curly
        term.input_write(b"\x1b[4;3m");
        assert_eq!(term.pen().underline, UnderlineStyle::Single);
        assert!(term.pen().italic);
    }

    #[test]
    fn test_terminal_underline_color_is_consumed() {
        let mut term = term();
        term.input_write(b"\x1b[58;5;5m");
        assert!(!term.pen().blink);
        assert_eq!(term.pen(), Pen::default());
    }

    #[test]
    fn test_terminal_erase() {
        let mut term = Terminal::new(3, 10, (), UnhandledPolicy::default());
        term.input_write(b"AAAAAAAAAA");
        term.input_write(b"\x1b[1;5H\x1b[0K");

        assert_eq!(term.cell(0, 3).unwrap().chars, vec!['A']);
        assert!(term.cell(0, 4).unwrap().chars.is_empty());
    }

    #[test]
    fn test_terminal_soft_wrap() {
        let mut term = term();
        term.input_write(&[b'x'; 120]);
        term.input_write(b"\r\n");

        assert!(!term.line_continuation(0));
        assert!(term.line_continuation(1));
        assert!(!term.line_continuation(2));
        assert!(!term.line_continuation(24));
    }

    #[test]
    fn test_terminal_reverse_screen_is_xored_into_cells() {
        let mut term = term();
        term.input_write(b"\x1b[7mA\x1b[27mB");
        assert!(term.cell(0, 0).unwrap().attrs.reverse);
        assert!(!term.cell(0, 1).unwrap().attrs.reverse);

        term.input_write(b"\x1b[?5h");
        assert!(!term.cell(0, 0).unwrap().attrs.reverse);
        assert!(term.cell(0, 1).unwrap().attrs.reverse);
        assert_eq!(
            term.listener().properties.last(),
            Some(&Property::Reverse(true))
        );
    }

    #[test]
    fn test_terminal_alternate_screen() {
        let mut term = term();
        term.input_write(b"Primary");
        term.input_write(b"\x1b[?1049h");

        assert!(term.screen().is_alternate_active());
        assert!(term.cell(0, 0).unwrap().chars.is_empty());

        term.input_write(b"Alternate");
        term.input_write(b"\x1b[?1049l");

        assert!(!term.screen().is_alternate_active());
        assert_eq!(text(&term, 0), "Primary");
        assert_eq!(term.cursor_position(), (0, 7));
        assert_eq!(
            term.listener().properties,
            vec![Property::AltScreen(true), Property::AltScreen(false)]
        );
    }

    #[test]
    fn test_terminal_alternate_screen_keeps_cursor() {
        let mut term = term();
        term.input_write(b"main\x1b[?1049halt");
        assert_eq!(term.cursor_position(), (0, 7));
        assert!(term.cell(0, 3).unwrap().chars.is_empty());
        assert_eq!(term.cell(0, 4).unwrap().chars, vec!['a']);
    }

    #[test]
    fn test_terminal_alternate_screen_disabled() {
        let mut term = Terminal::new(24, 80, Recorder::default(), UnhandledPolicy::default());
        term.input_write(b"\x1b[?1049h");
        assert!(!term.screen().is_alternate_active());
        assert!(term.listener().properties.is_empty());
    }

    #[test]
    fn test_terminal_title() {
        let mut term = term();
        term.input_write(b"\x1b]2;My Title\x07");
        term.input_write(b"\x1b]1;icon;with;semicolons\x1b\\");
        term.input_write(b"\x1b]0;both\x07");

        assert_eq!(
            term.listener().properties,
            vec![
                Property::Title("My Title".into()),
                Property::IconName("icon;with;semicolons".into()),
                Property::IconName("both".into()),
                Property::Title("both".into()),
            ]
        );
    }

    #[test]
    fn test_terminal_cursor_properties() {
        let mut term = term();
        term.input_write(b"\x1b[?25l\x1b[5 q\x1b[?12l");

        assert_eq!(
            term.listener().properties,
            vec![
                Property::CursorVisible(false),
                Property::CursorBlink(true),
                Property::CursorShape(CursorShape::Bar),
                Property::CursorBlink(false),
            ]
        );
    }

    #[test]
    fn test_terminal_mouse_modes() {
        let mut term = term();
        term.input_write(b"\x1b[?1000h\x1b[?1002h\x1b[?1003h\x1b[?1003l");

        assert_eq!(
            term.listener().properties,
            vec![
                Property::Mouse(MouseMode::Click),
                Property::Mouse(MouseMode::Drag),
                Property::Mouse(MouseMode::Movement),
                Property::Mouse(MouseMode::None),
            ]
        );
    }

    #[test]
    fn test_terminal_replies() {
        let mut term = term();
        term.input_write(b"\x1b[c\x1b[5n\x1b[3;4H\x1b[6n\x1b[>c");

        assert_eq!(
            term.listener().output,
            b"\x1b[?1;2c\x1b[0n\x1b[3;4R\x1b[>0;100;0c".to_vec()
        );
    }

    #[test]
    fn test_terminal_bell() {
        let mut term = term();
        term.input_write(b"a\x07b\x07");
        assert_eq!(term.listener().bells, 2);
        assert_eq!(text(&term, 0), "ab");
    }

    #[test]
    fn test_terminal_reset_announces_defaults() {
        let mut term = term();
        term.input_write(b"\x1b[1mX\x1b[?5h\x1b[?1000h\x1b[?1049h");
        term.listener_mut().properties.clear();

        term.reset();

        assert_eq!(term.pen(), Pen::default());
        assert!(term.cell(0, 0).unwrap().chars.is_empty());
        assert_eq!(
            term.listener().properties,
            vec![
                Property::CursorVisible(true),
                Property::CursorBlink(true),
                Property::CursorShape(CursorShape::Block),
                Property::Reverse(false),
                Property::AltScreen(false),
                Property::Mouse(MouseMode::None),
            ]
        );
    }

    #[test]
    fn test_terminal_reset_discards_partial_sequence() {
        let mut term = term();
        term.input_write(b"\x1b[3");
        term.reset();
        term.input_write(b"1mX");
        assert_eq!(term.cell(0, 0).unwrap().chars, vec!['1']);
    }

    #[test]
    fn test_terminal_unhandled_sequences_are_discarded() {
        let mut term = Terminal::new(
            24,
            80,
            Recorder::default(),
            UnhandledPolicy::uniform(crate::policy::Disposition::Trace),
        );
        term.input_write(b"\x1bP1$r\x1b\\\x1b]777;notify\x07\x1b[?9999h\x1b[5zok\x0e");
        assert_eq!(text(&term, 0), "ok");
        assert!(term.listener().properties.is_empty());
    }

    #[test]
    fn test_terminal_scroll_region() {
        let mut term = Terminal::new(5, 10, (), UnhandledPolicy::default());
        term.input_write(b"A\r\nB\r\nC\r\nD\r\nE");
        term.input_write(b"\x1b[2;4r");
        term.input_write(b"\x1b[4;1H\n");

        assert_eq!(term.screen().line(0).text(), "A");
        assert_eq!(term.screen().line(1).text(), "C");
        assert_eq!(term.screen().line(3).text(), "");
        assert_eq!(term.screen().line(4).text(), "E");
    }
}
