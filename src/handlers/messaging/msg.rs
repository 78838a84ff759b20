//! MSG handler.

use crate::error::HandlerError;
use crate::handlers::{Context, Flow, Handler, HandlerResult};
use async_trait::async_trait;
use courier_proto::{CommandRef, Reply, Verb};
use tracing::info;

/// The text a `MSG` line echoes back.
///
/// `None` when the text is empty or contains control characters other than
/// tab. A bare `\r` inside the text would otherwise end up in a reply line.
pub fn msg_text<'a>(cmd: &CommandRef<'a>) -> Option<&'a str> {
    let text = cmd.tail();
    let printable = !text.chars().any(|c| c.is_control() && c != '\t');
    (!text.is_empty() && printable).then_some(text)
}

/// Handler for `MSG <text...>`: a message to the server itself.
///
/// Logged and echoed back; nothing is routed.
pub struct MsgHandler;

#[async_trait]
impl Handler for MsgHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let Some(text) = msg_text(cmd) else {
            return Err(HandlerError::Malformed(Verb::Msg));
        };

        info!(user = ?ctx.username(), message = %text, "Message to server");

        ctx.reply(Reply::MessageReceived(text.to_owned())).await?;
        Ok(Flow::Continue)
    }
}
