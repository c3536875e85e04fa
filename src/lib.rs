//! # octomcp
//!
//! GitHub tool server and agent client speaking MCP-style JSON-RPC over
//! stdio. The server side exposes a fixed registry of GitHub REST
//! operations as tools; the client side parses one-line text commands,
//! drives exactly one tool call through a spawned server process, and
//! returns a uniform success/error value.
//!
//! The pieces, leaf first:
//! - [`command`] — free text to (tool name, argument map)
//! - [`github`] — the tool registry, dispatch and the REST executor
//! - [`schema`] — JSON-RPC framing and protocol payloads
//! - [`transport`] — stdio and child-process byte channels
//! - [`server`] / [`client`] — the two ends of the conversation
//! - [`agent`] — the session orchestrator gluing it all together

pub mod agent;
pub mod client;
pub mod command;
pub mod error;
pub mod github;
pub mod schema;
pub mod server;
pub mod transport;

// Re-export commonly used types
pub use schema::common::Tool;
pub use schema::json_rpc::{JSONRPCMessage, RequestId};

/// Protocol version constants
pub mod constants {
    /// The protocol version spoken by both sides
    pub const LATEST_PROTOCOL_VERSION: &str = "2024-11-05";
    /// The JSON-RPC version used on the wire
    pub const JSONRPC_VERSION: &str = "2.0";
}
