//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, StorageConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`limits`]: Per-connection limits (LimitsConfig)
//! - [`accounts`]: The credential table (AccountBlock)
//! - [`validation`]: Startup checks over a loaded config

mod accounts;
mod defaults;
mod limits;
mod listen;
mod types;
mod validation;

pub use accounts::AccountBlock;
pub use limits::LimitsConfig;
pub use listen::ListenConfig;
pub use types::{Config, ConfigError, ServerConfig, StorageConfig};
pub use validation::{ValidationError, validate};
