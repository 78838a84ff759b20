//! Messaging handlers: SEND (routed to a user's mailbox) and MSG (to the server).

mod msg;
mod send;

pub use msg::{MsgHandler, msg_text};
pub use send::SendHandler;
