//! Error types for the courier protocol library.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
///
/// Oversized and non-UTF-8 lines are *not* errors at this level: the codec
/// reports them as [`crate::InboundLine`] variants so the connection can
/// answer and keep going. Only transport failures end a stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound line contained an embedded newline.
    ///
    /// Replies are single lines; letting a newline through would let one
    /// user forge extra protocol lines on another user's connection.
    #[error("outbound line contains an embedded line break")]
    EmbeddedNewline,
}

impl ProtocolError {
    /// Whether the error means the peer is gone (broken pipe, reset, EOF).
    pub fn is_disconnect(&self) -> bool {
        match self {
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::NotConnected
            ),
            Self::EmbeddedNewline => false,
        }
    }
}
