//! Connection - Handles an individual client connection.
//!
//! Each Connection runs in its own Tokio task:
//!
//! ```text
//!   FramedRead<LineCodec> ──▶ Registry::dispatch ──▶ Outbound (shared writer)
//!          │                        │                      ▲
//!          │                  Flow::ReceiveFile            │
//!          ▼                        ▼                      │
//!   raw bytes ───────────▶ transfer::receive        Delivery Loop
//! ```
//!
//! The Delivery Loop of the connection's session writes through the same
//! `Outbound`, so deliveries and replies share one ordered line stream.

mod error_handling;
mod transfer;

use error_handling::{LineAction, ReadErrorAction, classify_line, classify_read_error};
use transfer::{Outcome, TransferLimits};

use crate::error::HandlerError;
use crate::handlers::{Context, FileOffer, Flow, Registry};
use crate::state::{ConnState, Hub, Outbound};
use courier_proto::{CommandRef, InboundLine, LineCodec, ProtocolError, Reply};
use futures_util::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why a connection stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// Peer closed the stream (including after an undeclared file transfer).
    Eof,
    /// Client sent EXIT.
    Exit,
    /// No input within the idle timeout.
    IdleTimeout,
    /// Server shutdown.
    Shutdown,
    /// A file transfer failed or went over the size limit.
    TransferAborted,
}

/// A client connection handler.
pub struct Connection {
    peer: SocketAddr,
    hub: Arc<Hub>,
    registry: Arc<Registry>,
    token: CancellationToken,
}

impl Connection {
    /// Create a connection handler. `token` should be a child of the
    /// server's root token.
    pub fn new(
        peer: SocketAddr,
        hub: Arc<Hub>,
        registry: Arc<Registry>,
        token: CancellationToken,
    ) -> Self {
        Self {
            peer,
            hub,
            registry,
            token,
        }
    }

    /// Serve the protocol on `stream` until it ends, then tear down.
    ///
    /// Teardown always runs: the session (if any) is removed from the
    /// directory and its Delivery Loop is stopped before this returns.
    pub async fn run<S>(self, stream: S) -> anyhow::Result<Ending>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read, write) = tokio::io::split(stream);
        let outbound = Outbound::new(write);
        let mut reader = FramedRead::new(read, LineCodec::with_max_len(self.hub.limits.max_line_len));
        let mut state = ConnState::Unauthenticated;

        let result = self.serve(&mut reader, &outbound, &mut state).await;
        self.teardown(state, &outbound).await;

        let ending = result?;
        debug!(peer = %self.peer, ending = ?ending, "Connection finished");
        Ok(ending)
    }

    async fn serve<R>(
        &self,
        reader: &mut FramedRead<R, LineCodec>,
        outbound: &Outbound,
        state: &mut ConnState,
    ) -> Result<Ending, HandlerError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let idle = self.hub.limits.idle_timeout();

        loop {
            let next = tokio::select! {
                _ = self.token.cancelled() => return Ok(Ending::Shutdown),
                next = next_line(reader, idle) => next,
            };

            let line = match next {
                None => {
                    info!(peer = %self.peer, user = ?state.username(), "Idle timeout");
                    if let Err(e) = outbound.send(Reply::IdleTimeout).await {
                        debug!(error = %e, "Could not send idle notice");
                    }
                    return Ok(Ending::IdleTimeout);
                }
                Some(None) => return Ok(Ending::Eof),
                Some(Some(Err(e))) => match classify_read_error(&e) {
                    ReadErrorAction::Disconnected => return Ok(Ending::Eof),
                    ReadErrorAction::IoError => return Err(e.into()),
                },
                Some(Some(Ok(line))) => line,
            };

            let text = match classify_line(line) {
                LineAction::Command(text) => text,
                LineAction::Reject(reply) => {
                    debug!(peer = %self.peer, reply = %reply, "Rejected inbound line");
                    outbound.send(reply).await?;
                    continue;
                }
            };

            let cmd = CommandRef::parse(&text);
            let mut ctx = Context {
                hub: &self.hub,
                state: &mut *state,
                outbound,
                peer: self.peer,
                token: &self.token,
            };

            let result = self.registry.dispatch(&mut ctx, &cmd).await;
            match result {
                Ok(Flow::Continue) => {}
                Ok(Flow::ReceiveFile(offer)) => {
                    if let Some(ending) = self.receive_file(reader, outbound, state, offer).await? {
                        return Ok(ending);
                    }
                }
                Err(HandlerError::Quit) => return Ok(Ending::Exit),
                Err(e) => match e.to_reply() {
                    Some(reply) => outbound.send(reply).await?,
                    None => return Err(e),
                },
            }
        }
    }

    /// Run file-transfer mode. `None` means back to command mode.
    async fn receive_file<R>(
        &self,
        reader: &mut FramedRead<R, LineCodec>,
        outbound: &Outbound,
        state: &ConnState,
        offer: FileOffer,
    ) -> Result<Option<Ending>, HandlerError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let FileOffer {
            name,
            path,
            mut file,
            declared,
        } = offer;
        let user = state.username().unwrap_or_default();
        let limits = TransferLimits {
            chunk_size: self.hub.limits.file_chunk_size,
            max_bytes: self.hub.store.max_bytes(),
            idle: self.hub.limits.idle_timeout(),
        };

        let outcome = transfer::receive(reader, &mut file, declared, limits, &self.token).await;
        drop(file);

        match outcome {
            Outcome::Complete { bytes } => {
                info!(user = %user, file = %name, bytes, "File received");
                outbound.send(Reply::FileReceived { name, bytes }).await?;
                Ok(None)
            }
            Outcome::StreamEnded { bytes } => {
                info!(user = %user, file = %name, bytes, "File received, stream ended");
                // The peer may only have closed its write side
                if let Err(e) = outbound.send(Reply::FileReceived { name, bytes }).await {
                    debug!(error = %e, "Could not confirm file after end of stream");
                }
                Ok(Some(Ending::Eof))
            }
            Outcome::Incomplete { bytes, expected } => {
                warn!(user = %user, file = %name, bytes, expected, "File transfer incomplete, keeping partial file");
                Ok(Some(Ending::Eof))
            }
            Outcome::TooLarge { bytes, limit } => {
                warn!(user = %user, file = %name, bytes, limit, "File over size limit, removing");
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %e, "Could not remove oversized file");
                }
                notify(outbound, Reply::FileTooLarge).await;
                Ok(Some(Ending::TransferAborted))
            }
            Outcome::IdleTimeout { bytes } => {
                warn!(user = %user, file = %name, bytes, "File transfer idle timeout");
                notify(outbound, Reply::IdleTimeout).await;
                Ok(Some(Ending::IdleTimeout))
            }
            Outcome::Cancelled { bytes } => {
                info!(user = %user, file = %name, bytes, "File transfer cancelled by shutdown");
                Ok(Some(Ending::Shutdown))
            }
            Outcome::Failed { bytes, error } => {
                warn!(user = %user, file = %name, bytes, error = %error, "File transfer failed");
                notify(outbound, Reply::FileTransferFailed).await;
                Ok(Some(Ending::TransferAborted))
            }
        }
    }

    async fn teardown(&self, mut state: ConnState, outbound: &Outbound) {
        if let Some(active) = state.take() {
            if let Err(e) = self.hub.directory.deregister(&active.session) {
                debug!(session = %active.session.id(), error = %e, "Session already gone from directory");
            }
            active.shutdown().await;
        }
        if let Err(e) = outbound.close().await {
            debug!(peer = %self.peer, error = %e, "Error closing connection");
        }
    }
}

/// Next inbound line. Outer `None` means the idle timeout fired.
async fn next_line<R>(
    reader: &mut FramedRead<R, LineCodec>,
    idle: Option<Duration>,
) -> Option<Option<Result<InboundLine, ProtocolError>>>
where
    R: AsyncRead + Unpin,
{
    match idle {
        Some(limit) => tokio::time::timeout(limit, reader.next()).await.ok(),
        None => Some(reader.next().await),
    }
}

/// Best-effort final notice before the connection closes.
async fn notify(outbound: &Outbound, reply: Reply) {
    if let Err(e) = outbound.send(reply).await {
        debug!(error = %e, "Could not send final notice");
    }
}
