//! RPC boundary
//!
//! - `protocol`: JSON-RPC 2.0 envelope types and error codes
//! - `server`:   axum routes wiring HTTP to the tool dispatcher

pub mod protocol;
pub mod server;
