//! Command handler registry and dispatch.
//!
//! The `Registry` maps verbs to handlers and keeps command usage counters.

use super::context::{Context, Flow, HandlerResult};
use super::traits::Handler;
use crate::error::HandlerError;
use crate::handlers::{
    connection::{ExitHandler, LoginHandler, SwitchHandler},
    messaging::{MsgHandler, SendHandler},
    transfer::FileHandler,
};
use crate::telemetry::{CommandTimer, spans};
use courier_proto::{CommandRef, Reply, Verb};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{Instrument, debug};

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<Verb, Box<dyn Handler>>,
    /// Command usage counters.
    command_counts: HashMap<Verb, AtomicU64>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<Verb, Box<dyn Handler>> = HashMap::new();

        // Session handlers
        handlers.insert(Verb::Login, Box::new(LoginHandler));
        handlers.insert(Verb::Switch, Box::new(SwitchHandler));
        handlers.insert(Verb::Exit, Box::new(ExitHandler));

        // Messaging handlers
        handlers.insert(Verb::Send, Box::new(SendHandler));
        handlers.insert(Verb::Msg, Box::new(MsgHandler));

        // File transfer
        handlers.insert(Verb::File, Box::new(FileHandler));

        let command_counts = handlers
            .keys()
            .map(|&verb| (verb, AtomicU64::new(0)))
            .collect();

        Self {
            handlers,
            command_counts,
        }
    }

    /// Command usage statistics, most used first.
    pub fn command_stats(&self) -> Vec<(Verb, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(verb, count)| (*verb, count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1));
        stats
    }

    /// Dispatch a parsed line to the handler for its verb.
    ///
    /// Lines that are not commands get "Unknown command." in every state.
    /// Commands that need a session fail with `NotLoggedIn` before their
    /// handler runs.
    pub async fn dispatch(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let verb = cmd.kind();

        let Some(handler) = self.handlers.get(&verb) else {
            debug!(verb = %cmd.verb(), "Unknown command");
            ctx.reply(Reply::UnknownCommand).await?;
            return Ok(Flow::Continue);
        };

        if let Some(counter) = self.command_counts.get(&verb) {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        if handler.requires_login() && !ctx.state.is_authenticated() {
            return Err(HandlerError::NotLoggedIn);
        }

        let span = spans::command(verb.name(), ctx.username());
        let _timer = CommandTimer::new(verb.name());

        let result = handler.handle(ctx, cmd).instrument(span).await;

        if let Err(ref e) = result {
            debug!(command = %verb, code = e.error_code(), error = %e, "Command error");
        }

        result
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
