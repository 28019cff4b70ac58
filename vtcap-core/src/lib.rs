//! vtcap core - terminal screen model
//!
//! This crate provides the emulation engine used by the capture harness:
//! - Screen grid with cells containing code points, width and pen
//! - Line metadata (auto-wrap continuation)
//! - Cursor, pen and mode state
//! - Escape sequence handling on top of the `vte` parser
//! - Property, reply and bell events pushed to an [`EventListener`]
//!
//! Given the same input bytes the engine always produces the same state.

mod cell;
mod color;
mod cursor;
mod event;
mod grid;
mod line;
mod modes;
mod policy;
mod screen;
mod terminal;

pub use cell::{char_width, Cell, Pen, UnderlineStyle, MAX_CHARS_PER_CELL};
pub use color::Color;
pub use cursor::{Cursor, CursorShape};
pub use event::{EventListener, Property};
pub use grid::Grid;
pub use line::Line;
pub use modes::{Modes, MouseMode};
pub use policy::{Category, Disposition, UnhandledPolicy};
pub use screen::Screen;
pub use terminal::{ScreenCell, Terminal};
