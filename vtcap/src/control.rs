//! NUL-framed control channel
//!
//! Commands and responses are byte strings terminated by a single NUL. A
//! read may deliver any number of frames, including partial ones; frames
//! are extracted in arrival order.

use std::io::{self, Write};

use crate::error::Result;

pub const FRAME_END: u8 = 0;

/// Notification sent when the child process has exited
pub const EXITED: &[u8] = b"*exited";

/// Notification sent for every BEL the child writes
pub const BELL: &[u8] = b"*bell";

const SEND_TO_INTERIOR: &[u8] = b"send-to-interior:";

/// Reassembles frames from a byte stream
#[derive(Debug, Default)]
pub struct FrameReader {
    pending: Vec<u8>,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes as read from the channel
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Remove and return the oldest complete frame, without its terminator
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let end = self.pending.iter().position(|&b| b == FRAME_END)?;
        let frame = self.pending[..end].to_vec();
        self.pending.drain(..=end);
        Some(frame)
    }

    /// Bytes of an incomplete frame still waiting for their terminator
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CaptureImg,
    CaptureAll,
    SendToInterior(Vec<u8>),
    Reset,
    Quit,
}

impl Command {
    /// Parse a frame. Unknown frames yield `Ok(None)`; a `send-to-interior:`
    /// frame with a malformed payload is an error.
    pub fn parse(frame: &[u8]) -> Result<Option<Self>> {
        let command = match frame {
            b"capture:img" => Self::CaptureImg,
            b"capture:all" => Self::CaptureAll,
            b"reset" => Self::Reset,
            b"quit" => Self::Quit,
            _ => match frame.strip_prefix(SEND_TO_INTERIOR) {
                Some(payload) => Self::SendToInterior(hex::decode(payload)?),
                None => return Ok(None),
            },
        };
        Ok(Some(command))
    }
}

/// Write `payload` followed by the terminator
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.extend_from_slice(payload);
    frame.push(FRAME_END);
    writer.write_all(&frame)?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use proptest::prelude::*;

    #[test]
    fn test_several_frames_in_one_read() {
        let mut reader = FrameReader::new();
        reader.push(b"capture:img\0reset\0qu");
        assert_eq!(reader.next_frame().as_deref(), Some(&b"capture:img"[..]));
        assert_eq!(reader.next_frame().as_deref(), Some(&b"reset"[..]));
        assert_eq!(reader.next_frame(), None);
        assert_eq!(reader.pending(), 2);
        reader.push(b"it\0");
        assert_eq!(reader.next_frame().as_deref(), Some(&b"quit"[..]));
        assert_eq!(reader.pending(), 0);
    }

    #[test]
    fn test_empty_frame() {
        let mut reader = FrameReader::new();
        reader.push(b"\0");
        assert_eq!(reader.next_frame(), Some(Vec::new()));
        assert_eq!(Command::parse(b"").unwrap(), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(b"capture:img").unwrap(), Some(Command::CaptureImg));
        assert_eq!(Command::parse(b"capture:all").unwrap(), Some(Command::CaptureAll));
        assert_eq!(Command::parse(b"reset").unwrap(), Some(Command::Reset));
        assert_eq!(Command::parse(b"quit").unwrap(), Some(Command::Quit));
        assert_eq!(
            Command::parse(b"send-to-interior:48656c6c6f").unwrap(),
            Some(Command::SendToInterior(b"Hello".to_vec()))
        );
        assert_eq!(
            Command::parse(b"send-to-interior:").unwrap(),
            Some(Command::SendToInterior(Vec::new()))
        );
    }

    #[test]
    fn test_commands_are_exact_and_case_sensitive() {
        let frames: [&[u8]; 6] = [
            b"Quit",
            b"quit ",
            b"capture:IMG",
            b"capture",
            b"reset\n",
            b"send-to-interior",
        ];
        for frame in frames {
            assert_eq!(Command::parse(frame).unwrap(), None, "{:?}", frame);
        }
    }

    #[test]
    fn test_malformed_hex_is_an_error() {
        assert!(matches!(
            Command::parse(b"send-to-interior:abc"),
            Err(Error::InvalidHex(_))
        ));
        assert!(matches!(
            Command::parse(b"send-to-interior:zz"),
            Err(Error::InvalidHex(_))
        ));
    }

    #[test]
    fn test_write_frame_appends_terminator() {
        let mut out = Vec::new();
        write_frame(&mut out, EXITED).unwrap();
        write_frame(&mut out, b"").unwrap();
        assert_eq!(out, b"*exited\0\0");
    }

    proptest! {
        #[test]
        fn frames_survive_arbitrary_splits(
            frames in proptest::collection::vec(proptest::collection::vec(1u8..=255, 0..20), 0..10),
            chunk in 1usize..16,
        ) {
            let stream: Vec<u8> = frames
                .iter()
                .flat_map(|f| f.iter().copied().chain(std::iter::once(FRAME_END)))
                .collect();
            let mut reader = FrameReader::new();
            let mut received = Vec::new();
            for piece in stream.chunks(chunk) {
                reader.push(piece);
                while let Some(frame) = reader.next_frame() {
                    received.push(frame);
                }
            }
            prop_assert_eq!(received, frames);
            prop_assert_eq!(reader.pending(), 0);
        }
    }
}
