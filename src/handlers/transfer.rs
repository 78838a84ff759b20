//! FILE handler.
//!
//! Validates the request and creates the destination; the bytes themselves
//! are read by the connection's transfer loop after this returns
//! [`Flow::ReceiveFile`].

use crate::error::{HandlerError, StorageError};
use crate::handlers::{Context, FileOffer, Flow, Handler, HandlerResult};
use async_trait::async_trait;
use courier_proto::{CommandRef, Reply, Verb};
use tracing::{info, warn};

/// Split `FILE` arguments into a file name and an optional declared size.
///
/// With two or more arguments and an all-digit last token, that token is
/// the byte count. The remaining tokens, joined with single spaces, form the
/// name.
pub fn parse_file_args(args: &[&str]) -> (String, Option<u64>) {
    if let [name @ .., last] = args {
        if !name.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(size) = last.parse::<u64>() {
                return (name.join(" "), Some(size));
            }
        }
    }
    (args.join(" "), None)
}

/// Handler for `FILE <name> [<size>]`.
pub struct FileHandler;

#[async_trait]
impl Handler for FileHandler {
    async fn handle(&self, ctx: &mut Context<'_>, cmd: &CommandRef<'_>) -> HandlerResult {
        let user = ctx.require_session()?.username().to_owned();

        if cmd.arg_count() == 0 {
            return Err(HandlerError::Malformed(Verb::File));
        }
        let (name, declared) = parse_file_args(cmd.args());

        if let Some(size) = declared {
            ctx.hub.store.check_size(size)?;
        }

        let (path, file) = ctx.hub.store.create(&user, &name).await.inspect_err(|e| {
            if let StorageError::Io(io) = e {
                warn!(user = %user, file = %name, error = %io, "Cannot create destination file");
            }
        })?;

        info!(user = %user, file = %name, path = %path.display(), declared = ?declared, "File transfer starting");

        ctx.reply(Reply::ReadyToReceive(name.clone())).await?;
        Ok(Flow::ReceiveFile(FileOffer {
            name,
            path,
            file,
            declared,
        }))
    }
}
