//! Per-connection limits configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{default_file_chunk_size, default_max_line_len};

/// Per-connection limits.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum command line length in bytes, newline included (default: 4096).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Seconds without any input before the connection is dropped (default: 0 = never).
    /// Applies in command mode and in file-transfer mode.
    #[serde(default)]
    pub idle_timeout: u64,
    /// Read size used while receiving a file (default: 1024).
    #[serde(default = "default_file_chunk_size")]
    pub file_chunk_size: usize,
}

impl LimitsConfig {
    /// Idle timeout as a duration (`None` = disabled).
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout > 0).then(|| Duration::from_secs(self.idle_timeout))
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
            idle_timeout: 0,
            file_chunk_size: default_file_chunk_size(),
        }
    }
}
