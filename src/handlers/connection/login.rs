//! LOGIN handler.

use super::{activate, new_session};
use crate::error::HandlerError;
use crate::handlers::{Context, Flow, Handler, HandlerResult};
use crate::state::ConnState;
use async_trait::async_trait;
use courier_proto::{CommandRef, Reply, Verb};
use tracing::info;

/// Handler for `LOGIN <user> <pass>`.
///
/// On success the session and its mailbox are registered together, the
/// Delivery Loop is started and the connection becomes authenticated.
pub struct LoginHandler;

#[async_trait]
impl Handler for LoginHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        if let Some(current) = ctx.username() {
            return Err(HandlerError::AlreadyLoggedIn(current.to_owned()));
        }

        let &[username, password] = cmd.args() else {
            return Err(HandlerError::Malformed(Verb::Login));
        };

        if !ctx.hub.validator.validate(username, password) {
            info!(peer = %ctx.peer, user = %username, "Login rejected");
            return Err(HandlerError::InvalidCredentials);
        }

        let (session, handle, inbox) = new_session(ctx, username, password);
        ctx.hub.directory.register(session.clone(), handle)?;

        info!(
            session = %session.id(),
            peer = %ctx.peer,
            user = %username,
            "User logged in"
        );
        let active = activate(ctx, session, inbox);
        *ctx.state = ConnState::Authenticated(active);

        ctx.reply(Reply::LoginOk).await?;
        Ok(Flow::Continue)
    }

    fn requires_login(&self) -> bool {
        false
    }
}
