//! Sessions and per-connection protocol state.
//!
//! A [`Session`] is one authenticated identity bound to one connection. Its
//! identity never changes: switching users ends one session and starts
//! another. The connection tracks which session (if any) it currently owns
//! through [`ConnState`].

use super::mailbox::DeliveryReport;
use super::outbound::Outbound;
use super::uid::SessionId;
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// How long teardown waits for a cancelled Delivery Loop to finish.
const DELIVERY_GRACE: Duration = Duration::from_secs(2);

/// One authenticated identity bound to one connection.
pub struct Session {
    id: SessionId,
    username: String,
    password: Zeroizing<String>,
    peer: SocketAddr,
    outbound: Outbound,
    live: AtomicBool,
    logged_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        id: SessionId,
        username: impl Into<String>,
        password: impl Into<String>,
        peer: SocketAddr,
        outbound: Outbound,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password: Zeroizing::new(password.into()),
            peer,
            outbound,
            live: AtomicBool::new(true),
            logged_in_at: Utc::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// The owning connection's write half.
    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    /// Whether the password this session logged in with equals `candidate`.
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password.as_str() == candidate
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Flip the liveness flag. Only the owning connection calls this.
    pub fn mark_closed(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Time since login.
    pub fn duration(&self) -> chrono::Duration {
        Utc::now() - self.logged_in_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("peer", &self.peer)
            .field("live", &self.is_live())
            .field("logged_in_at", &self.logged_in_at)
            .finish_non_exhaustive()
    }
}

/// A session owned by a connection together with its Delivery Loop.
pub struct ActiveSession {
    pub session: Arc<Session>,
    /// Cancels the Delivery Loop. Child of the connection's token.
    pub token: CancellationToken,
    pub delivery: JoinHandle<DeliveryReport>,
}

impl ActiveSession {
    pub fn username(&self) -> &str {
        self.session.username()
    }

    /// Stop the Delivery Loop and wait for it to exit.
    ///
    /// The session must already be out of the directory (deregistered or
    /// switched away from) so no new mail can arrive.
    pub async fn shutdown(self) {
        let Self {
            session,
            token,
            mut delivery,
        } = self;

        session.mark_closed();
        token.cancel();

        match tokio::time::timeout(DELIVERY_GRACE, &mut delivery).await {
            Ok(Ok(report)) => {
                debug!(
                    session = %session.id(),
                    user = %session.username(),
                    delivered = report.delivered,
                    discarded = report.discarded,
                    "Delivery loop stopped"
                );
            }
            Ok(Err(e)) => {
                warn!(session = %session.id(), user = %session.username(), error = %e, "Delivery loop panicked");
            }
            Err(_) => {
                warn!(session = %session.id(), user = %session.username(), "Delivery loop did not stop in time, aborting");
                delivery.abort();
            }
        }

        info!(
            session = %session.id(),
            user = %session.username(),
            peer = %session.peer(),
            duration_secs = session.duration().num_seconds(),
            "Session ended"
        );
    }
}

/// Protocol state of one connection.
///
/// File-transfer mode is not a variant here: it is entered and left inside
/// a single command dispatch and always returns to `Authenticated` or ends
/// the connection.
#[derive(Default)]
pub enum ConnState {
    #[default]
    Unauthenticated,
    Authenticated(ActiveSession),
}

impl ConnState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        match self {
            Self::Authenticated(active) => Some(active),
            Self::Unauthenticated => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.active().map(ActiveSession::username)
    }

    /// Take the active session out, leaving the connection unauthenticated.
    pub fn take(&mut self) -> Option<ActiveSession> {
        match std::mem::take(self) {
            Self::Authenticated(active) => Some(active),
            Self::Unauthenticated => None,
        }
    }
}
