//! State management module.
//!
//! Contains the Hub (shared server state), the Session Directory and the
//! per-user session, mailbox and delivery loop.

mod directory;
mod hub;
mod mailbox;
mod outbound;
mod session;
mod uid;

pub use directory::SessionDirectory;
pub use hub::Hub;
pub use mailbox::{DeliveryReport, Letter, Mailbox, MailboxHandle, mailbox, spawn_delivery_loop};
pub use outbound::Outbound;
pub use session::{ActiveSession, ConnState, Session};
pub use uid::{SessionId, SessionIdGenerator};
