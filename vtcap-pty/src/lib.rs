//! vtcap PTY - pseudoterminal management
//!
//! Allocates a master/subordinate pair with a fixed geometry and runs a
//! child program on the subordinate side as its controlling terminal.
//!
//! Reference: https://www.man7.org/linux/man-pages/man3/openpty.3.html

mod child;
mod error;
mod pty;
mod size;

pub use child::Child;
pub use error::{Error, Result};
pub use nix::sys::wait::WaitStatus;
pub use pty::Pty;
pub use size::WindowSize;
