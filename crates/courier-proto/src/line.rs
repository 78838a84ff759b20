//! Line-based codec for tokio.
//!
//! This module provides a codec that reads/writes newline-terminated lines.
//! Unlike a plain lines codec, it never fails the stream on bad input:
//! oversized lines are discarded up to their newline and reported as
//! [`InboundLine::TooLong`], undecodable ones as [`InboundLine::InvalidUtf8`].
//! A connection can answer those and keep reading.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};

/// Default maximum line length in bytes, terminator included.
pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

/// One decoded inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundLine {
    /// A complete line without its `\r\n` / `\n` terminator.
    Text(String),
    /// A line longer than the limit; its bytes were dropped.
    TooLong {
        /// Bytes seen before the limit tripped (lower bound of the real length).
        seen: usize,
    },
    /// A line that is not valid UTF-8.
    InvalidUtf8 {
        /// Offset of the first invalid byte.
        byte_pos: usize,
    },
}

/// Line-based codec that handles newline-terminated messages.
///
/// By default, lines are limited to [`DEFAULT_MAX_LINE_LEN`] bytes.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Dropping an oversized line until its newline shows up
    discarding: Option<usize>,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Create a new codec with the default limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len: max_len.max(1),
            discarding: None,
        }
    }

    /// Forget scan progress.
    ///
    /// Must be called after bytes were taken out of the read buffer behind
    /// the codec's back (file-transfer mode does this).
    pub fn reset(&mut self) {
        self.next_index = 0;
        self.discarding = None;
    }

    fn strip_terminator(line: &[u8]) -> &[u8] {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        line.strip_suffix(b"\r").unwrap_or(line)
    }
}

impl Decoder for LineCodec {
    type Item = InboundLine;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<InboundLine>> {
        if let Some(seen) = self.discarding {
            return match src.iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    let _ = src.split_to(offset + 1);
                    self.discarding = None;
                    self.next_index = 0;
                    Ok(Some(InboundLine::TooLong {
                        seen: seen + offset + 1,
                    }))
                }
                None => {
                    self.discarding = Some(seen + src.len());
                    src.clear();
                    Ok(None)
                }
            };
        }

        // Look for newline starting from where we left off
        let start = self.next_index.min(src.len());
        if let Some(offset) = src[start..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(start + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Ok(Some(InboundLine::TooLong { seen: line.len() }));
            }

            let body = Self::strip_terminator(&line);
            match std::str::from_utf8(body) {
                Ok(text) => Ok(Some(InboundLine::Text(text.to_owned()))),
                Err(e) => Ok(Some(InboundLine::InvalidUtf8 {
                    byte_pos: e.valid_up_to(),
                })),
            }
        } else if src.len() > self.max_len {
            // Partial line already exceeds the limit: drop it and skip to its end
            self.discarding = Some(src.len());
            self.next_index = 0;
            src.clear();
            Ok(None)
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();
            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<InboundLine>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if self.discarding.take().is_some() {
            return Ok(None);
        }
        // An unterminated final line still counts as a line
        if src.is_empty() {
            return Ok(None);
        }
        let line = src.split_to(src.len());
        self.next_index = 0;
        match std::str::from_utf8(Self::strip_terminator(&line)) {
            Ok(text) => Ok(Some(InboundLine::Text(text.to_owned()))),
            Err(e) => Ok(Some(InboundLine::InvalidUtf8 {
                byte_pos: e.valid_up_to(),
            })),
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        let body = msg.strip_suffix('\n').unwrap_or(&msg);
        if body.contains(|c| c == '\n' || c == '\r') {
            return Err(ProtocolError::EmbeddedNewline);
        }
        dst.reserve(body.len() + 1);
        dst.put_slice(body.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Option<InboundLine> {
        Some(InboundLine::Text(s.to_string()))
    }

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("LOGIN user1 pass1\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), text("LOGIN user1 pass1"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("SEND us");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"er2 hi\nMSG");
        assert_eq!(codec.decode(&mut buf).unwrap(), text("SEND user2 hi"));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(&buf[..], b"MSG");
    }

    #[test]
    fn test_decode_too_long_recovers() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\nEXIT\n");

        assert!(matches!(
            codec.decode(&mut buf).unwrap(),
            Some(InboundLine::TooLong { .. })
        ));
        assert_eq!(codec.decode(&mut buf).unwrap(), text("EXIT"));
    }

    #[test]
    fn test_decode_too_long_across_reads() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from("0123456789abc");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());

        buf.extend_from_slice(b"defgh");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"ij\nEXIT\n");
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(InboundLine::TooLong { seen: 21 })
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), text("EXIT"));
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"MSG \xff\xfe\n"[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(InboundLine::InvalidUtf8 { byte_pos: 4 })
        );
    }

    #[test]
    fn test_decode_eof_unterminated() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("EXIT");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), text("EXIT"));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_reset_after_external_split() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("raw-bytes");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        let _ = buf.split_to(4);
        codec.reset();
        buf.extend_from_slice(b"\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), text("bytes"));
    }

    #[test]
    fn test_encode() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("Login successful!".to_string(), &mut buf).unwrap();
        codec.encode("Recipient not found.\n".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"Login successful!\nRecipient not found.\n");
    }

    #[test]
    fn test_encode_rejects_embedded_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        let result = codec.encode("one\ntwo".to_string(), &mut buf);
        assert!(matches!(result, Err(ProtocolError::EmbeddedNewline)));
        assert!(buf.is_empty());
    }
}
