//! EXIT handler for closing the connection.

use crate::error::HandlerError;
use crate::handlers::{Context, Handler, HandlerResult};
use async_trait::async_trait;
use courier_proto::{CommandRef, Reply};
use tracing::info;

/// Handler for EXIT command.
pub struct ExitHandler;

#[async_trait]
impl Handler for ExitHandler {
    async fn handle(&self, ctx: &mut Context<'_>, _cmd: &CommandRef<'_>) -> HandlerResult {
        info!(peer = %ctx.peer, user = ?ctx.username(), "Client exit");

        ctx.reply(Reply::Closing).await?;

        // Signal exit by returning Quit error that connection loop will handle
        Err(HandlerError::Quit)
    }

    fn requires_login(&self) -> bool {
        false
    }
}
