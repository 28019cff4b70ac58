//! Session state mirrored from engine events
//!
//! The engine pushes property changes, replies and bells into [`Mirror`] as
//! it parses child output. Replies go straight to the child; the rest is
//! kept for the snapshot encoder and the control channel.

use std::io::Write;

use vtcap_core::{CursorShape, EventListener, MouseMode, Property};

/// Latest values of the properties a snapshot reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub cursor_visible: bool,
    pub cursor_blink: bool,
    pub cursor_shape: CursorShape,
    pub mouse: MouseMode,
    pub alt_screen: bool,
    /// Screen-wide reverse video (DECSCNM)
    pub reverse: bool,
    /// `None` until the application sets a title
    pub title: Option<String>,
    pub icon_title: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            cursor_visible: true,
            cursor_blink: true,
            cursor_shape: CursorShape::Block,
            mouse: MouseMode::None,
            alt_screen: false,
            reverse: false,
            title: None,
            icon_title: None,
        }
    }
}

impl SessionState {
    /// Replace the field the property refers to
    pub fn apply(&mut self, property: Property) {
        match property {
            Property::CursorVisible(visible) => self.cursor_visible = visible,
            Property::CursorBlink(blink) => self.cursor_blink = blink,
            Property::CursorShape(shape) => self.cursor_shape = shape,
            Property::AltScreen(active) => self.alt_screen = active,
            Property::Title(title) => self.title = Some(title),
            Property::IconName(name) => self.icon_title = Some(name),
            Property::Reverse(reverse) => self.reverse = reverse,
            Property::Mouse(mode) => self.mouse = mode,
        }
    }
}

/// Engine listener that keeps [`SessionState`] current and forwards replies
/// to the child through `writer`.
pub struct Mirror<W: Write> {
    state: SessionState,
    writer: W,
    bells: usize,
}

impl<W: Write> Mirror<W> {
    pub fn new(writer: W) -> Self {
        Self {
            state: SessionState::default(),
            writer,
            bells: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Write bytes to the child's input. Failures are logged, not returned:
    /// the child may already be gone.
    pub fn send(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let result = self
            .writer
            .write_all(bytes)
            .and_then(|()| self.writer.flush());
        if let Err(e) = result {
            log::warn!("Failed to write {} bytes to child: {}", bytes.len(), e);
        }
    }

    /// Number of bells received since the last call
    pub fn take_bells(&mut self) -> usize {
        std::mem::take(&mut self.bells)
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> EventListener for Mirror<W> {
    fn property(&mut self, property: Property) {
        log::debug!("Property {:?}", property);
        self.state.apply(property);
    }

    fn output(&mut self, bytes: &[u8]) {
        self.send(bytes);
    }

    fn bell(&mut self) {
        self.bells += 1;
    }
}
