//! Gateway - TCP listener that accepts incoming connections.
//!
//! The Gateway binds the listening socket and spawns a Connection task for
//! each incoming client.

use crate::handlers::Registry;
use crate::network::Connection;
use crate::state::Hub;
use crate::telemetry::spans;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, instrument};

/// The Gateway accepts incoming TCP connections and spawns handlers.
pub struct Gateway {
    listener: TcpListener,
    hub: Arc<Hub>,
    registry: Arc<Registry>,
    token: CancellationToken,
}

impl Gateway {
    /// Bind the gateway to the specified address.
    ///
    /// `token` is the server's root token; every connection gets a child.
    pub async fn bind(
        addr: SocketAddr,
        hub: Arc<Hub>,
        token: CancellationToken,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, server = %hub.name, "Listener bound");

        Ok(Self {
            listener,
            hub,
            registry: Arc::new(Registry::new()),
            token,
        })
    }

    /// The bound address (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the root token is cancelled.
    #[instrument(skip(self), name = "gateway")]
    pub async fn run(self) -> anyhow::Result<()> {
        loop {
            let accepted = tokio::select! {
                _ = self.token.cancelled() => {
                    info!(commands = ?self.registry.command_stats(), "Gateway shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, addr)) => {
                    info!(%addr, "Connection accepted");

                    let connection = Connection::new(
                        addr,
                        Arc::clone(&self.hub),
                        Arc::clone(&self.registry),
                        self.token.child_token(),
                    );

                    tokio::spawn(
                        async move {
                            match connection.run(stream).await {
                                Ok(ending) => info!(%addr, ?ending, "Connection closed"),
                                Err(e) => error!(%addr, error = %e, "Connection error"),
                            }
                        }
                        .instrument(spans::connection(addr)),
                    );
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
