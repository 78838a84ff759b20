//! SWITCH handler.

use super::{activate, new_session};
use crate::error::HandlerError;
use crate::handlers::{Context, Flow, Handler, HandlerResult};
use crate::state::ConnState;
use async_trait::async_trait;
use courier_proto::{CommandRef, Reply, Verb};
use tracing::info;

/// Handler for `SWITCH <user> <pass>`.
///
/// Identity is immutable per session, so switching ends the current
/// session and starts a new one. The directory swaps the two entries in
/// one lock hold; the old Delivery Loop is then stopped and any mail still
/// queued for the old identity is dropped.
pub struct SwitchHandler;

#[async_trait]
impl Handler for SwitchHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let current = ctx.require_session()?.session.clone();

        let &[username, password] = cmd.args() else {
            return Err(HandlerError::Malformed(Verb::Switch));
        };

        // Same identity: answered from the session itself, no directory change
        if username == current.username() {
            if current.password_matches(password) {
                return Err(HandlerError::AlreadyLoggedIn(username.to_owned()));
            }
            return Err(HandlerError::InvalidSwitchCredentials);
        }

        if !ctx.hub.validator.validate(username, password) {
            info!(session = %current.id(), user = %current.username(), target = %username, "Switch rejected");
            return Err(HandlerError::InvalidSwitchCredentials);
        }

        let (session, handle, inbox) = new_session(ctx, username, password);
        ctx.hub.directory.switch(&current, session.clone(), handle)?;

        info!(
            old_session = %current.id(),
            new_session = %session.id(),
            from = %current.username(),
            to = %username,
            "Switched identity"
        );

        let active = activate(ctx, session, inbox);
        let previous = std::mem::replace(&mut *ctx.state, ConnState::Authenticated(active));
        if let ConnState::Authenticated(old) = previous {
            old.shutdown().await;
        }

        ctx.reply(Reply::Switched(username.to_owned())).await?;
        Ok(Flow::Continue)
    }
}
