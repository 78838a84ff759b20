//! Command handlers.
//!
//! This module contains the Handler trait and command registry for
//! dispatching parsed command lines to the appropriate handler.
//!
//! Handlers receive a `CommandRef<'_>` which borrows directly from the
//! decoded line. Use `cmd.arg(n)` to access arguments as `&str` slices.

mod connection;
mod core;
mod messaging;
mod transfer;

pub use connection::{ExitHandler, LoginHandler, SwitchHandler};
pub use core::{Context, FileOffer, Flow, Handler, HandlerResult, Registry};
pub use messaging::{MsgHandler, SendHandler, msg_text};
pub use transfer::{FileHandler, parse_file_args};
