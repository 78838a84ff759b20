//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use super::accounts::AccountBlock;

pub fn default_server_name() -> String {
    "courier.local".to_string()
}

// =============================================================================
// Listener Defaults
// =============================================================================

pub fn default_listen_address() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

// =============================================================================
// Storage Defaults
// =============================================================================

pub fn default_storage_root() -> PathBuf {
    PathBuf::from("received_files")
}

// =============================================================================
// Limit Defaults
// =============================================================================

pub fn default_max_line_len() -> usize {
    courier_proto::DEFAULT_MAX_LINE_LEN
}

pub fn default_file_chunk_size() -> usize {
    1024
}

// =============================================================================
// Account Defaults
// =============================================================================

/// Demo accounts used when the config has no `[[account]]` blocks.
pub fn default_accounts() -> Vec<AccountBlock> {
    tracing::warn!(
        "No [[account]] blocks configured - using built-in demo accounts \
         (user1/pass1, user2/pass2, user3/pass3). Do not expose this server."
    );
    vec![
        AccountBlock::new("user1", "pass1"),
        AccountBlock::new("user2", "pass2"),
        AccountBlock::new("user3", "pass3"),
    ]
}
