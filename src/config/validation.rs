//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::storage::is_safe_component;
use std::collections::HashSet;
use thiserror::Error;

/// Smallest line limit that still fits every command form.
const MIN_LINE_LEN: usize = 64;
/// Largest read size accepted for file-transfer mode.
const MAX_FILE_CHUNK: usize = 1024 * 1024;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("storage.root is required")]
    MissingStorageRoot,
    #[error("limits.max_line_len must be at least 64, got {0}")]
    LineLimitTooSmall(usize),
    #[error("limits.file_chunk_size must be between 1 and 1048576, got {0}")]
    InvalidChunkSize(usize),
    #[error("account name must be a plain directory name without whitespace: {0:?}")]
    InvalidAccountName(String),
    #[error("duplicate account name: {0}")]
    DuplicateAccount(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if config.storage.root.as_os_str().is_empty() {
        errors.push(ValidationError::MissingStorageRoot);
    }

    if config.limits.max_line_len < MIN_LINE_LEN {
        errors.push(ValidationError::LineLimitTooSmall(config.limits.max_line_len));
    }
    let chunk = config.limits.file_chunk_size;
    if chunk == 0 || chunk > MAX_FILE_CHUNK {
        errors.push(ValidationError::InvalidChunkSize(chunk));
    }

    // Account names double as storage directory names
    let mut seen = HashSet::new();
    for account in &config.accounts {
        if !is_safe_component(&account.name) || account.name.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidAccountName(account.name.clone()));
        } else if !seen.insert(account.name.as_str()) {
            errors.push(ValidationError::DuplicateAccount(account.name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccountBlock;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&Config::parse("").unwrap()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = Config::parse("").unwrap();
        config.server.name = "  ".into();
        config.limits.max_line_len = 10;
        config.limits.file_chunk_size = 0;
        config.accounts = vec![
            AccountBlock::new("alice", "a"),
            AccountBlock::new("alice", "b"),
            AccountBlock::new("bad name", "c"),
            AccountBlock::new("../escape", "d"),
        ];

        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateAccount(n) if n == "alice")));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidAccountName(_))));
    }
}
