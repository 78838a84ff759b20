//! # courier-proto
//!
//! Wire vocabulary for the courier command server.
//!
//! The protocol is plain text: every client command and every server reply
//! is a single newline-terminated line. The only exception is file-transfer
//! mode, where the connection carries raw bytes after a `Ready to receive`
//! reply; that mode is driven by the server, this crate only frames lines.
//!
//! ## Features
//!
//! - [`CommandRef`]: borrowed view of one command line (verb + arguments)
//! - [`Reply`]: every response the server can emit, rendered via `Display`
//! - [`LineCodec`]: tokio-util codec for newline-delimited lines that
//!   survives oversized and non-UTF-8 input (feature `tokio`)
//!
//! ## Quick Start
//!
//! ```rust
//! use courier_proto::{CommandRef, Reply};
//!
//! let cmd = CommandRef::parse("SEND user2 hello there");
//! assert_eq!(cmd.verb(), "SEND");
//! assert_eq!(cmd.arg(0), Some("user2"));
//! assert_eq!(cmd.joined_from(1), "hello there");
//!
//! let reply = Reply::MessageSent("user2".into());
//! assert_eq!(reply.to_string(), "Message sent to user2.");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod reply;

pub use self::command::{CommandRef, Verb};
pub use self::error::ProtocolError;
#[cfg(feature = "tokio")]
pub use self::line::{InboundLine, LineCodec, DEFAULT_MAX_LINE_LEN};
pub use self::reply::Reply;
