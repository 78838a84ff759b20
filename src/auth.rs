//! Credential validation.
//!
//! The core only ever asks "is this pair valid?". Where the credentials
//! live is up to the [`CredentialValidator`] handed to the server.

use crate::config::AccountBlock;
use std::collections::HashMap;
use zeroize::Zeroizing;

/// Answers whether a username/password pair may log in.
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, username: &str, password: &str) -> bool;
}

impl<F> CredentialValidator for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn validate(&self, username: &str, password: &str) -> bool {
        self(username, password)
    }
}

/// Fixed credential table, built from the `[[account]]` config blocks.
#[derive(Default)]
pub struct StaticCredentials {
    accounts: HashMap<String, Zeroizing<String>>,
}

impl StaticCredentials {
    pub fn from_accounts(accounts: &[AccountBlock]) -> Self {
        let accounts = accounts
            .iter()
            .map(|a| (a.name.clone(), a.password.clone()))
            .collect();
        Self { accounts }
    }
}

impl CredentialValidator for StaticCredentials {
    fn validate(&self, username: &str, password: &str) -> bool {
        self.accounts
            .get(username)
            .is_some_and(|expected| expected.as_str() == password)
    }
}
