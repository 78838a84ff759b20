//! Classification of inbound lines and read errors.

use courier_proto::{InboundLine, ProtocolError, Reply};

/// What to do with one decoded inbound line.
pub(super) enum LineAction {
    /// A text line to parse and dispatch.
    Command(String),
    /// Recoverable framing problem: answer and keep reading.
    Reject(Reply),
}

/// Classify a decoded line.
pub(super) fn classify_line(line: InboundLine) -> LineAction {
    match line {
        InboundLine::Text(text) => LineAction::Command(text),
        InboundLine::TooLong { .. } => LineAction::Reject(Reply::LineTooLong),
        InboundLine::InvalidUtf8 { .. } => LineAction::Reject(Reply::InvalidEncoding),
    }
}

/// Classification of transport read errors.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// The peer went away; treat like end of stream.
    Disconnected,
    /// Anything else: log and disconnect.
    IoError,
}

/// Classify a transport read error into an actionable category.
pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    if e.is_disconnect() {
        ReadErrorAction::Disconnected
    } else {
        ReadErrorAction::IoError
    }
}
