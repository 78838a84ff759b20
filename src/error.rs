//! Unified error handling for courierd.
//!
//! This module provides the error hierarchy for the server core, with
//! automatic conversions and protocol reply generation.

use courier_proto::{ProtocolError, Reply, Verb};
use thiserror::Error;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not logged in")]
    NotLoggedIn,

    #[error("already logged in as {0}")]
    AlreadyLoggedIn(String),

    #[error("user {0} is already logged in")]
    UserBusy(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid credentials for switch")]
    InvalidSwitchCredentials,

    /// Wrong argument shape; the verb selects the usage reply.
    #[error("malformed {0} command")]
    Malformed(Verb),

    #[error("recipient not found: {0}")]
    RecipientNotFound(String),

    #[error("file rejected: {0}")]
    File(#[from] StorageError),

    #[error("transport error: {0}")]
    Transport(#[from] ProtocolError),

    #[error("client quit")]
    Quit,

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "not_logged_in",
            Self::AlreadyLoggedIn(_) => "already_logged_in",
            Self::UserBusy(_) => "user_busy",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidSwitchCredentials => "invalid_switch_credentials",
            Self::Malformed(_) => "malformed",
            Self::RecipientNotFound(_) => "recipient_not_found",
            Self::File(_) => "file_rejected",
            Self::Transport(_) => "transport_error",
            Self::Quit => "quit",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Convert to the reply line the client sees.
    ///
    /// Returns `None` for errors that don't warrant a client-visible reply
    /// (transport failures, quit, internal errors). Those end the connection.
    pub fn to_reply(&self) -> Option<Reply> {
        let reply = match self {
            Self::NotLoggedIn => Reply::LoginRequired,
            Self::AlreadyLoggedIn(user) => Reply::AlreadyLoggedIn(user.clone()),
            Self::UserBusy(user) => Reply::UserBusy(user.clone()),
            Self::InvalidCredentials => Reply::InvalidCredentials,
            Self::InvalidSwitchCredentials => Reply::InvalidSwitchCredentials,
            Self::Malformed(verb) => usage_reply(*verb),
            Self::RecipientNotFound(_) => Reply::RecipientNotFound,
            Self::File(StorageError::InvalidFileName(_)) => Reply::InvalidFileName,
            Self::File(StorageError::FileTooLarge { .. }) => Reply::FileTooLarge,
            Self::File(_) => Reply::FileTransferFailed,

            // These errors don't get client-visible replies
            Self::Transport(_) => return None,
            Self::Quit => return None,
            Self::Internal(_) => return None,
        };
        Some(reply)
    }
}

fn usage_reply(verb: Verb) -> Reply {
    match verb {
        Verb::Login => Reply::InvalidLoginFormat,
        Verb::Switch => Reply::InvalidSwitchFormat,
        Verb::Send => Reply::InvalidSendFormat,
        Verb::Msg => Reply::InvalidMsgFormat,
        Verb::File => Reply::InvalidFileFormat,
        Verb::Exit | Verb::Unknown => Reply::UnknownCommand,
    }
}

impl From<DirectoryError> for HandlerError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::AlreadyRegistered(user) => Self::UserBusy(user),
            DirectoryError::RecipientNotFound(user) => Self::RecipientNotFound(user),
            DirectoryError::NotRegistered(user) => {
                Self::Internal(format!("session for {user} missing from directory"))
            }
        }
    }
}

// ============================================================================
// Directory Errors
// ============================================================================

/// Session directory errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("{0} is already registered")]
    AlreadyRegistered(String),

    #[error("no mailbox for {0}")]
    RecipientNotFound(String),

    #[error("{0} is not registered to this session")]
    NotRegistered(String),
}

// ============================================================================
// Storage Errors
// ============================================================================

/// Received-file storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("file of {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}
