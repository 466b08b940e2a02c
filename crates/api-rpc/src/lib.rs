//! JSON-RPC API Layer
//!
//! JSON-RPC 2.0 over HTTP and WebSocket: report submission, listing, and a
//! subscription that streams every job status change.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
