//! Network module.
//!
//! Contains the Gateway (TCP listener), the per-connection handler with its
//! file-transfer mode, and the stateless datagram binding.

mod connection;
pub mod datagram;
mod gateway;

pub use connection::Connection;
pub use datagram::DatagramBinding;
pub use gateway::Gateway;
