//! Per-user mailboxes and the Delivery Loop.
//!
//! A mailbox is an unbounded single-consumer queue. The Session Directory
//! keeps the producing half ([`MailboxHandle`]); the consuming half
//! ([`Mailbox`]) is moved into the user's Delivery Loop. Posting never
//! suspends, so a slow recipient can't stall a sender's connection.

use super::session::Session;
use courier_proto::Reply;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One queued message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Letter {
    /// Sending username (logged, not shown to the recipient).
    pub from: String,
    pub text: String,
}

impl Letter {
    pub fn new(from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            text: text.into(),
        }
    }
}

/// Producer half of a mailbox.
#[derive(Debug, Clone)]
pub struct MailboxHandle {
    tx: mpsc::UnboundedSender<Letter>,
}

impl MailboxHandle {
    /// Enqueue a letter. Fails (handing the letter back) once the
    /// consuming side is gone.
    pub fn post(&self, letter: Letter) -> Result<(), Letter> {
        self.tx.send(letter).map_err(|e| e.0)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half of a mailbox.
#[derive(Debug)]
pub struct Mailbox {
    rx: mpsc::UnboundedReceiver<Letter>,
}

impl Mailbox {
    /// Wait for the next letter. `None` means every handle is gone.
    pub async fn recv(&mut self) -> Option<Letter> {
        self.rx.recv().await
    }

    /// Close the queue and drop whatever is still in it, returning the count.
    pub fn close_and_drain(&mut self) -> usize {
        self.rx.close();
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

/// Create a connected mailbox pair.
pub fn mailbox() -> (MailboxHandle, Mailbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MailboxHandle { tx }, Mailbox { rx })
}

/// What a Delivery Loop did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Letters written to the connection.
    pub delivered: u64,
    /// Letters dropped: failed writes plus mail still queued at shutdown.
    pub discarded: u64,
}

/// Spawn the Delivery Loop for `session`.
///
/// The loop writes every letter to the session's connection in queue
/// order. It exits when `token` is cancelled or when the queue is closed
/// (the directory dropped its handle). Write failures are logged and the
/// letter is dropped.
pub fn spawn_delivery_loop(
    session: Arc<Session>,
    mut mailbox: Mailbox,
    token: CancellationToken,
) -> JoinHandle<DeliveryReport> {
    tokio::spawn(async move {
        let mut report = DeliveryReport::default();

        loop {
            let letter = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    let dropped = mailbox.close_and_drain();
                    if dropped > 0 {
                        info!(
                            session = %session.id(),
                            user = %session.username(),
                            dropped,
                            "Discarding undelivered mail"
                        );
                    }
                    report.discarded += dropped as u64;
                    break;
                }
                letter = mailbox.recv() => letter,
            };

            let Some(letter) = letter else {
                debug!(session = %session.id(), user = %session.username(), "Mailbox closed");
                break;
            };

            match session.outbound().send(Reply::Delivered(letter.text)).await {
                Ok(()) => {
                    debug!(user = %session.username(), from = %letter.from, "Delivered message");
                    report.delivered += 1;
                }
                Err(e) => {
                    warn!(
                        session = %session.id(),
                        user = %session.username(),
                        from = %letter.from,
                        error = %e,
                        "Delivery failed, dropping message"
                    );
                    report.discarded += 1;
                }
            }
        }

        report
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Outbound, SessionIdGenerator};
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, BufReader};

    fn session(outbound: Outbound) -> Arc<Session> {
        Arc::new(Session::new(
            SessionIdGenerator::new().next(),
            "user2",
            "pass2",
            "127.0.0.1:4000".parse().unwrap(),
            outbound,
        ))
    }

    #[tokio::test]
    async fn delivers_in_order_and_exits_when_handles_drop() {
        let (client, server) = tokio::io::duplex(4096);
        let session = session(Outbound::new(server));
        let (handle, mailbox) = mailbox();
        let task = spawn_delivery_loop(session, mailbox, CancellationToken::new());

        for i in 0..5 {
            handle.post(Letter::new("user1", format!("msg {i}"))).unwrap();
        }
        drop(handle);

        let report = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.delivered, 5);

        let mut lines = BufReader::new(client).lines();
        for i in 0..5 {
            let line = lines.next_line().await.unwrap().unwrap();
            assert_eq!(line, format!("Received from another user: msg {i}"));
        }
    }

    #[tokio::test]
    async fn cancellation_unblocks_idle_loop() {
        let (_client, server) = tokio::io::duplex(64);
        let session = session(Outbound::new(server));
        let (handle, mailbox) = mailbox();
        let token = CancellationToken::new();
        let task = spawn_delivery_loop(session, mailbox, token.clone());

        token.cancel();
        let report = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report, DeliveryReport::default());
        assert!(handle.is_closed());
        assert!(handle.post(Letter::new("a", "late")).is_err());
    }

    #[tokio::test]
    async fn write_failure_is_dropped_not_fatal() {
        let (client, server) = tokio::io::duplex(64);
        drop(client);
        let session = session(Outbound::new(server));
        let (handle, mailbox) = mailbox();
        let task = spawn_delivery_loop(session, mailbox, CancellationToken::new());

        handle.post(Letter::new("user1", "lost")).unwrap();
        handle.post(Letter::new("user1", "also lost")).unwrap();
        drop(handle);

        let report = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.delivered, 0);
        assert_eq!(report.discarded, 2);
    }

    #[test]
    fn close_and_drain_counts_pending() {
        let (handle, mut mailbox) = mailbox();
        handle.post(Letter::new("a", "1")).unwrap();
        handle.post(Letter::new("a", "2")).unwrap();
        assert_eq!(mailbox.close_and_drain(), 2);
        assert!(handle.post(Letter::new("a", "3")).is_err());
    }
}
