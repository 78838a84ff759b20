//! Core handler infrastructure.
//!
//! This module contains the fundamental types for the command handler
//! system: the handler trait, the per-command context and the registry
//! that dispatches parsed lines to handlers.

pub mod context;
pub mod registry;
pub mod traits;

// Re-export commonly used types
pub use context::{Context, FileOffer, Flow, HandlerResult};
pub use registry::Registry;
pub use traits::Handler;
