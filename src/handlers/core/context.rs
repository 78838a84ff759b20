//! Command handler context and core types.
//!
//! Defines the `Context` struct passed to all handlers and the `Flow`
//! value a handler returns to steer the connection loop.

use crate::error::HandlerError;
use crate::state::{ActiveSession, ConnState, Hub, Outbound};
use courier_proto::Reply;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::sync::CancellationToken;

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// Shared server state.
    pub hub: &'a Arc<Hub>,
    /// This connection's protocol state.
    pub state: &'a mut ConnState,
    /// Write half of this connection.
    pub outbound: &'a Outbound,
    /// Remote address of the client.
    pub peer: SocketAddr,
    /// Connection token. Session tokens are created as its children.
    pub token: &'a CancellationToken,
}

impl Context<'_> {
    /// Write one reply line to this connection.
    pub async fn reply(&self, reply: Reply) -> Result<(), HandlerError> {
        self.outbound.send(reply).await?;
        Ok(())
    }

    /// Username of the active session, if any.
    pub fn username(&self) -> Option<&str> {
        self.state.username()
    }

    /// The active session, or `NotLoggedIn`.
    pub fn require_session(&self) -> Result<&ActiveSession, HandlerError> {
        self.state.active().ok_or(HandlerError::NotLoggedIn)
    }
}

/// What the connection loop does after a command.
#[derive(Debug)]
pub enum Flow {
    /// Keep reading command lines.
    Continue,
    /// Switch to raw-byte mode and write the stream into the offered file.
    ReceiveFile(FileOffer),
}

/// An accepted FILE command, ready for the transfer loop.
#[derive(Debug)]
pub struct FileOffer {
    /// Name as the client sent it.
    pub name: String,
    /// Where the bytes go.
    pub path: PathBuf,
    /// The destination, already created.
    pub file: File,
    /// Byte count from `FILE <name> <size>`; `None` means read to end of stream.
    pub declared: Option<u64>,
}

/// Result type for command handlers.
pub type HandlerResult = Result<Flow, HandlerError>;
