//! The command handler trait.

use super::context::{Context, HandlerResult};
use async_trait::async_trait;
use courier_proto::CommandRef;

/// A handler for one command verb.
///
/// Handlers answer the client through `ctx.reply` and report client-visible
/// failures as `HandlerError`s; the connection loop turns those into reply
/// lines via `HandlerError::to_reply`.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult;

    /// Whether the command is refused with "Please log in first." when the
    /// connection has no session. The registry checks this before `handle`.
    fn requires_login(&self) -> bool {
        true
    }
}
