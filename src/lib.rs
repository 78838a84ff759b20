//! courierd - line-oriented command server with per-user mailboxes.
//!
//! Clients log in over a long-lived TCP connection, then send each other
//! messages (`SEND`), talk to the server (`MSG`) and upload files (`FILE`).
//! The binary in `main.rs` wires these modules together; integration tests
//! drive them in-process.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod network;
pub mod state;
pub mod storage;
pub mod telemetry;
