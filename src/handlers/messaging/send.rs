//! SEND handler.

use crate::error::HandlerError;
use crate::handlers::{Context, Flow, Handler, HandlerResult};
use crate::state::Letter;
use async_trait::async_trait;
use courier_proto::{CommandRef, Reply, Verb};
use tracing::debug;

/// Handler for `SEND <user> <text...>`.
///
/// Fire-and-forget: the letter is queued on the recipient's mailbox and the
/// sender is acknowledged. Whether the recipient's connection accepts the
/// write later is not reported back.
pub struct SendHandler;

#[async_trait]
impl Handler for SendHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let from = ctx.require_session()?.username().to_owned();

        let Some(recipient) = cmd.arg(0).filter(|_| cmd.arg_count() >= 2) else {
            return Err(HandlerError::Malformed(Verb::Send));
        };
        let text = cmd.joined_from(1);

        ctx.hub
            .directory
            .deliver(recipient, Letter::new(from.as_str(), text))?;
        debug!(from = %from, to = %recipient, "Message queued");

        ctx.reply(Reply::MessageSent(recipient.to_owned())).await?;
        Ok(Flow::Continue)
    }
}
