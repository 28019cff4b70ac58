//! Error types for the capture harness

use std::io;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("PTY error: {0}")]
    Pty(#[from] vtcap_pty::Error),

    #[error("System error: {0}")]
    Nix(#[from] nix::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `send-to-interior:` payload that is not an even-length hex string
    #[error("Malformed hex payload: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

pub type Result<T> = std::result::Result<T, Error>;
