//! Events pushed from the terminal to its embedder

use crate::cursor::CursorShape;
use crate::modes::MouseMode;

/// Terminal property changes reported to the listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    CursorVisible(bool),
    CursorBlink(bool),
    CursorShape(CursorShape),
    AltScreen(bool),
    /// Window title (OSC 0, OSC 2)
    Title(String),
    /// Icon name (OSC 0, OSC 1)
    IconName(String),
    /// Whole-screen reverse video (DECSCNM)
    Reverse(bool),
    Mouse(MouseMode),
}

/// Receiver of terminal events.
///
/// Every method is invoked synchronously from [`crate::Terminal::input_write`]
/// or [`crate::Terminal::reset`], in the order the input produced them.
pub trait EventListener {
    /// A property changed
    fn property(&mut self, _property: Property) {}

    /// Bytes the terminal sends back to the application (DA, DSR replies)
    fn output(&mut self, _bytes: &[u8]) {}

    /// BEL was received
    fn bell(&mut self) {}
}

/// Listener that drops every event
impl EventListener for () {}

/// Listener that records every event, for inspection
#[cfg(test)]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Recorder {
    pub properties: Vec<Property>,
    pub output: Vec<u8>,
    pub bells: usize,
}

#[cfg(test)]
impl EventListener for Recorder {
    fn property(&mut self, property: Property) {
        self.properties.push(property);
    }

    fn output(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    fn bell(&mut self) {
        self.bells += 1;
    }
}
