//! Error types for PTY operations

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to open PTY: {0}")]
    Open(nix::Error),

    /// Program name or an argument contained an interior NUL
    #[error("Invalid argument for exec: {0}")]
    InvalidArgument(String),

    #[error("Failed to spawn child: {0}")]
    Spawn(nix::Error),

    #[error("Failed to query window size: {0}")]
    WindowSize(io::Error),

    #[error("System error: {0}")]
    Nix(#[from] nix::Error),
}

/// Result type for PTY operations
pub type Result<T> = std::result::Result<T, Error>;
