//! The Session Directory.
//!
//! Process-wide table of logged-in users: username to [`Session`] and
//! username to [`MailboxHandle`]. Both maps sit behind one lock and are
//! always updated together. Every operation holds the lock for a map
//! lookup or insert only, never across a network or file write.

use super::mailbox::{Letter, MailboxHandle};
use super::session::Session;
use crate::error::DirectoryError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Tables {
    sessions: HashMap<String, Arc<Session>>,
    mailboxes: HashMap<String, MailboxHandle>,
}

impl Tables {
    /// Whether `session` is the one registered under its username.
    fn owns(&self, session: &Session) -> bool {
        self.sessions
            .get(session.username())
            .is_some_and(|current| current.id() == session.id())
    }

    fn remove(&mut self, username: &str) {
        self.sessions.remove(username);
        self.mailboxes.remove(username);
    }

    fn insert(&mut self, session: Arc<Session>, mailbox: MailboxHandle) {
        let username = session.username().to_owned();
        self.mailboxes.insert(username.clone(), mailbox);
        self.sessions.insert(username, session);
    }
}

/// Shared registry of logged-in users.
#[derive(Default)]
pub struct SessionDirectory {
    tables: Mutex<Tables>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and its mailbox under the session's username.
    ///
    /// Fails with `AlreadyRegistered` if the username is taken; the live
    /// session is left alone.
    pub fn register(
        &self,
        session: Arc<Session>,
        mailbox: MailboxHandle,
    ) -> Result<(), DirectoryError> {
        let mut tables = self.tables.lock();
        if tables.sessions.contains_key(session.username()) {
            return Err(DirectoryError::AlreadyRegistered(
                session.username().to_owned(),
            ));
        }
        tables.insert(session, mailbox);
        Ok(())
    }

    pub fn lookup(&self, username: &str) -> Option<Arc<Session>> {
        self.tables.lock().sessions.get(username).cloned()
    }

    pub fn lookup_mailbox(&self, username: &str) -> Option<MailboxHandle> {
        self.tables.lock().mailboxes.get(username).cloned()
    }

    pub fn is_logged_in(&self, username: &str) -> bool {
        self.tables
            .lock()
            .sessions
            .get(username)
            .is_some_and(|session| session.is_live())
    }

    /// Enqueue a letter for `recipient` while holding the lock.
    ///
    /// Posting is non-blocking, so enqueue order across senders is the
    /// order in which they took the lock.
    pub fn deliver(&self, recipient: &str, letter: Letter) -> Result<(), DirectoryError> {
        let tables = self.tables.lock();
        let mailbox = tables
            .mailboxes
            .get(recipient)
            .ok_or_else(|| DirectoryError::RecipientNotFound(recipient.to_owned()))?;
        mailbox
            .post(letter)
            .map_err(|_| DirectoryError::RecipientNotFound(recipient.to_owned()))
    }

    /// Remove `session` and its mailbox.
    ///
    /// Only removes the entry if it still belongs to this exact session, so
    /// a late teardown can never evict a newer login under the same name.
    pub fn deregister(&self, session: &Session) -> Result<(), DirectoryError> {
        let mut tables = self.tables.lock();
        if !tables.owns(session) {
            return Err(DirectoryError::NotRegistered(session.username().to_owned()));
        }
        tables.remove(session.username());
        Ok(())
    }

    /// Replace `old` with a new identity in one lock hold.
    ///
    /// Fails without changing anything if the new username is taken or
    /// `old` is no longer registered.
    pub fn switch(
        &self,
        old: &Session,
        new: Arc<Session>,
        mailbox: MailboxHandle,
    ) -> Result<(), DirectoryError> {
        let mut tables = self.tables.lock();
        if tables.sessions.contains_key(new.username()) {
            return Err(DirectoryError::AlreadyRegistered(new.username().to_owned()));
        }
        if !tables.owns(old) {
            return Err(DirectoryError::NotRegistered(old.username().to_owned()));
        }
        tables.remove(old.username());
        tables.insert(new, mailbox);
        Ok(())
    }

    /// Number of logged-in users.
    pub fn len(&self) -> usize {
        self.tables.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logged-in usernames, sorted.
    pub fn usernames(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tables.lock().sessions.keys().cloned().collect();
        names.sort();
        names
    }
}
