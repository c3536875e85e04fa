//! Message schema for the tool-invocation protocol
//!
//! JSON-RPC 2.0 framing plus the MCP-flavored payloads exchanged between
//! the agent client and the tool server: initialization, tool discovery
//! and tool invocation.

pub mod client;
pub mod common;
pub mod json_rpc;
pub mod server;
