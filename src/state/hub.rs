//! The Hub - central shared state for the server.
//!
//! Built once at startup and handed by `Arc` to every connection and
//! Delivery Loop. Nothing here is global.

use super::directory::SessionDirectory;
use super::uid::SessionIdGenerator;
use crate::auth::{CredentialValidator, StaticCredentials};
use crate::config::{Config, LimitsConfig};
use crate::storage::FileStore;
use std::sync::Arc;

/// Shared server state.
pub struct Hub {
    /// Server name, used in logs.
    pub name: String,
    /// Logged-in users and their mailboxes.
    pub directory: SessionDirectory,
    /// Credential check for LOGIN and SWITCH.
    pub validator: Arc<dyn CredentialValidator>,
    /// Destination for received files.
    pub store: FileStore,
    /// Per-connection limits.
    pub limits: LimitsConfig,
    /// Session id generator.
    pub session_ids: SessionIdGenerator,
}

impl Hub {
    /// Build the hub with an explicit credential validator.
    pub fn new(config: &Config, validator: Arc<dyn CredentialValidator>) -> Self {
        Self {
            name: config.server.name.clone(),
            directory: SessionDirectory::new(),
            validator,
            store: FileStore::from_config(&config.storage),
            limits: config.limits.clone(),
            session_ids: SessionIdGenerator::new(),
        }
    }

    /// Build the hub using the config's `[[account]]` table.
    pub fn from_config(config: &Config) -> Self {
        let validator = Arc::new(StaticCredentials::from_accounts(&config.accounts));
        Self::new(config, validator)
    }
}
