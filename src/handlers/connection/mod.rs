//! Session lifecycle handlers: LOGIN, SWITCH, EXIT.

mod exit;
mod login;
mod switch;

pub use exit::ExitHandler;
pub use login::LoginHandler;
pub use switch::SwitchHandler;

use crate::handlers::Context;
use crate::state::{ActiveSession, Mailbox, MailboxHandle, Session, mailbox, spawn_delivery_loop};
use std::sync::Arc;

/// Build a fresh session and mailbox for `username`. Nothing is registered yet.
fn new_session(
    ctx: &Context<'_>,
    username: &str,
    password: &str,
) -> (Arc<Session>, MailboxHandle, Mailbox) {
    let session = Arc::new(Session::new(
        ctx.hub.session_ids.next(),
        username,
        password,
        ctx.peer,
        ctx.outbound.clone(),
    ));
    let (handle, inbox) = mailbox();
    (session, handle, inbox)
}

/// Start the Delivery Loop for a session that is now in the directory.
fn activate(ctx: &Context<'_>, session: Arc<Session>, inbox: Mailbox) -> ActiveSession {
    let token = ctx.token.child_token();
    let delivery = spawn_delivery_loop(session.clone(), inbox, token.clone());
    ActiveSession {
        session,
        token,
        delivery,
    }
}
