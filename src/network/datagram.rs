//! Stateless datagram binding.
//!
//! Each datagram is split into lines and every line is answered on its own.
//! Nothing is remembered between datagrams: LOGIN only checks credentials,
//! and commands that need a session or a byte stream are refused.

use crate::auth::CredentialValidator;
use crate::handlers::msg_text;
use courier_proto::{CommandRef, Reply, Verb};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Largest datagram read in one go.
const MAX_DATAGRAM: usize = 64 * 1024;

/// Answer one line received over the datagram transport.
///
/// Returns `None` for lines that get no answer (EXIT).
pub fn respond(validator: &dyn CredentialValidator, line: &str) -> Option<Reply> {
    let cmd = CommandRef::parse(line);
    let reply = match cmd.kind() {
        Verb::Login => match cmd.args() {
            &[user, pass] if validator.validate(user, pass) => Reply::LoginOk,
            &[_, _] => Reply::InvalidCredentials,
            _ => Reply::InvalidLoginFormat,
        },
        Verb::Msg => match msg_text(&cmd) {
            Some(text) => {
                info!(message = %text, "Datagram message to server");
                Reply::MessageReceived(text.to_owned())
            }
            None => Reply::InvalidMsgFormat,
        },
        Verb::Exit => return None,
        Verb::Send | Verb::File | Verb::Switch => Reply::DatagramUnsupported,
        Verb::Unknown => Reply::UnknownCommand,
    };
    Some(reply)
}

/// UDP socket speaking the stateless command profile.
pub struct DatagramBinding {
    socket: UdpSocket,
    validator: Arc<dyn CredentialValidator>,
    token: CancellationToken,
}

impl DatagramBinding {
    pub async fn bind(
        addr: SocketAddr,
        validator: Arc<dyn CredentialValidator>,
        token: CancellationToken,
    ) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!(addr = %socket.local_addr()?, "Datagram socket bound");
        Ok(Self {
            socket,
            validator,
            token,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Serve datagrams until the token is cancelled.
    #[instrument(skip(self), name = "datagram")]
    pub async fn run(self) -> anyhow::Result<()> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            let received = tokio::select! {
                _ = self.token.cancelled() => {
                    info!("Datagram socket shutting down");
                    return Ok(());
                }
                received = self.socket.recv_from(&mut buf) => received,
            };

            let (len, peer) = match received {
                Ok(r) => r,
                Err(e) => {
                    // One bad peer must not stop the socket
                    warn!(error = %e, "Datagram receive failed");
                    continue;
                }
            };

            let text = String::from_utf8_lossy(&buf[..len]);
            debug!(%peer, len, "Datagram received");

            for line in text.lines() {
                let Some(reply) = respond(self.validator.as_ref(), line) else {
                    continue;
                };
                let mut out = reply.to_string();
                out.push('\n');
                if let Err(e) = self.socket.send_to(out.as_bytes(), peer).await {
                    warn!(%peer, error = %e, "Datagram reply failed");
                    break;
                }
            }
        }
    }
}
