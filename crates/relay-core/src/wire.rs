//! Relay wire format — one JSON-encoded [`Message`] per line.
//!
//! ```text
//! {"sender":"alice","recipient":null,"body":"hello"}\n
//! ```
//!
//! Framing is delegated to `LinesCodec`, which enforces the maximum frame
//! length and tolerates `\r\n` line endings. Blank lines are skipped.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::message::Message;

/// Upper bound on one encoded message, newline excluded.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame exceeds {0} bytes")]
    FrameTooLong(usize),
    #[error("invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Line-delimited JSON codec for [`Message`].
#[derive(Debug, Clone)]
pub struct MessageCodec {
    lines: LinesCodec,
    max_frame_bytes: usize,
}

impl MessageCodec {
    pub fn new() -> Self {
        Self::with_max_frame_bytes(DEFAULT_MAX_FRAME_BYTES)
    }

    pub fn with_max_frame_bytes(max_frame_bytes: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_frame_bytes),
            max_frame_bytes,
        }
    }

    pub fn max_frame_bytes(&self) -> usize {
        self.max_frame_bytes
    }

    fn lift(&self, e: LinesCodecError) -> WireError {
        match e {
            LinesCodecError::MaxLineLengthExceeded => WireError::FrameTooLong(self.max_frame_bytes),
            LinesCodecError::Io(e) => WireError::Io(e),
        }
    }

    fn parse(line: &str) -> Result<Option<Message>, WireError> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(line)?))
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = WireError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, WireError> {
        loop {
            let line = match self.lines.decode(src) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) => return Err(self.lift(e)),
            };
            if let Some(msg) = Self::parse(&line)? {
                return Ok(Some(msg));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Message>, WireError> {
        loop {
            let line = match self.lines.decode_eof(src) {
                Ok(Some(line)) => line,
                Ok(None) => return Ok(None),
                Err(e) => return Err(self.lift(e)),
            };
            if let Some(msg) = Self::parse(&line)? {
                return Ok(Some(msg));
            }
        }
    }
}

impl<'a> Encoder<&'a Message> for MessageCodec {
    type Error = WireError;

    fn encode(&mut self, msg: &'a Message, dst: &mut BytesMut) -> Result<(), WireError> {
        // serde_json escapes control characters, so the encoding is one line.
        let json = serde_json::to_string(msg)?;
        self.lines.encode(json, dst).map_err(|e| self.lift(e))
    }
}
