//! Telemetry utilities for command timing and standard spans.

use std::time::Instant;
use tracing::debug;

/// Guard for timing command execution.
///
/// Logs command latency at debug level when dropped.
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let micros = self.start.elapsed().as_micros();
        debug!(command = self.command, elapsed_us = micros as u64, "Command finished");
    }
}

/// Standardized span constructors.
pub mod spans {
    use std::net::SocketAddr;
    use tracing::{Span, debug_span, info_span};

    /// Create a span for a client connection.
    pub fn connection(peer: SocketAddr) -> Span {
        info_span!("connection", peer = %peer)
    }

    /// Create a span for a command execution.
    pub fn command(name: &str, user: Option<&str>) -> Span {
        if let Some(user) = user {
            debug_span!("command", name = %name, user = %user)
        } else {
            debug_span!("command", name = %name)
        }
    }
}
