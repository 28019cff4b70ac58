//! vtcap - terminal capture harness
//!
//! Runs a program inside a pseudo-terminal, mirrors the screen it draws and
//! serves deterministic JSON snapshots of it over a NUL-framed control
//! channel:
//! - [`color`] and [`escape`]: canonical forms of colors and text
//! - [`snapshot`]: `capture:img` and `capture:all` payloads
//! - [`mirror`]: session properties pushed by the engine
//! - [`control`]: frame reassembly and command parsing
//! - [`session`]: the event loop tying child, engine and driver together

pub mod color;
pub mod config;
pub mod control;
pub mod error;
pub mod escape;
pub mod mirror;
pub mod session;
pub mod snapshot;

pub use config::{CliArgs, Config, ConfigError};
pub use error::{Error, Result};
pub use session::{Session, State};
