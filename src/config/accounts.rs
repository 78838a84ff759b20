//! Credential table configuration.

use serde::Deserialize;
use std::fmt;
use zeroize::Zeroizing;

/// One login account.
#[derive(Clone, Deserialize)]
pub struct AccountBlock {
    /// Username (used in LOGIN and as the storage directory name).
    pub name: String,
    /// Plaintext password.
    pub password: Zeroizing<String>,
}

impl AccountBlock {
    /// Build an account from literal credentials.
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl fmt::Debug for AccountBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountBlock")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}
