//! Client side of the protocol
//!
//! The client drives the JSON-RPC conversation with a tool server
//! through a transport: initialize the connection, invoke tools, list
//! them, and shut down. One request is awaited per call; there is no
//! pipelining.
//!
//! ## Example
//!
//! ```rust,no_run
//! use octomcp::{client::Client, transport::child::ChildProcessTransport};
//! use serde_json::Map;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), octomcp::error::MCPError> {
//!     let transport = ChildProcessTransport::new("octomcp", vec!["serve".to_string()]);
//!     let mut client = Client::new(transport);
//!
//!     client.initialize().await?;
//!     let mut args = Map::new();
//!     args.insert("username".to_string(), "octocat".into());
//!     let result = client.call_tool("list_repositories", args).await?;
//!     println!("{:?}", result.texts());
//!
//!     client.shutdown().await
//! }
//! ```

use crate::{
    constants::LATEST_PROTOCOL_VERSION,
    error::MCPError,
    schema::client::{CallToolParams, ListToolsResult},
    schema::json_rpc::{JSONRPCMessage, JSONRPCRequest, RequestId},
    schema::server::CallToolResult,
    transport::Transport,
};
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::time::timeout;

/// Protocol client over an arbitrary transport
pub struct Client<T: Transport> {
    transport: T,
    next_request_id: i64,
    timeout_duration: Option<Duration>,
}

impl<T: Transport> Client<T> {
    /// Create a new client with the given transport
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            next_request_id: 1,
            timeout_duration: None,
        }
    }

    /// Set a timeout for every receive operation
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout_duration = Some(duration);
        self
    }

    /// Start the transport and perform the initialization handshake
    pub async fn initialize(&mut self) -> Result<Value, MCPError> {
        self.transport.start().await?;

        let request = JSONRPCRequest::new(
            self.next_request_id(),
            "initialize".to_string(),
            Some(serde_json::json!({
                "protocol_version": LATEST_PROTOCOL_VERSION
            })),
        );
        self.transport.send(&JSONRPCMessage::Request(request)).await?;

        let response: JSONRPCMessage = self.receive_with_timeout().await?;
        match response {
            JSONRPCMessage::Response(resp) => Ok(resp.result),
            JSONRPCMessage::Error(err) => Err(MCPError::Protocol(format!(
                "Initialization failed: {}",
                err.error.message
            ))),
            _ => Err(MCPError::Protocol("Unexpected response type".to_string())),
        }
    }

    /// Invoke one tool and return its result envelope
    ///
    /// A tool-level failure is a normal return here, flagged inside the
    /// [`CallToolResult`]; an `Err` means the envelope itself was bad.
    pub async fn call_tool(
        &mut self,
        tool_name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult, MCPError> {
        let params = CallToolParams {
            name: tool_name.to_string(),
            arguments: Some(arguments.into_iter().collect()),
        };

        let request = JSONRPCRequest::new(
            self.next_request_id(),
            "tools/call".to_string(),
            Some(serde_json::to_value(params)?),
        );
        self.transport.send(&JSONRPCMessage::Request(request)).await?;

        let response: JSONRPCMessage = self.receive_with_timeout().await?;
        match response {
            JSONRPCMessage::Response(resp) => serde_json::from_value(resp.result)
                .map_err(|e| MCPError::Protocol(format!("Invalid tool call result: {}", e))),
            JSONRPCMessage::Error(err) => Err(MCPError::Protocol(format!(
                "Tool call failed: {}",
                err.error.message
            ))),
            _ => Err(MCPError::Protocol("Unexpected response type".to_string())),
        }
    }

    /// Fetch the server's tool registry
    pub async fn list_tools(&mut self) -> Result<ListToolsResult, MCPError> {
        let request =
            JSONRPCRequest::new(self.next_request_id(), "tools/list".to_string(), None);
        self.transport.send(&JSONRPCMessage::Request(request)).await?;

        let response: JSONRPCMessage = self.receive_with_timeout().await?;
        match response {
            JSONRPCMessage::Response(resp) => serde_json::from_value(resp.result)
                .map_err(|e| MCPError::Protocol(format!("Invalid tools list: {}", e))),
            JSONRPCMessage::Error(err) => Err(MCPError::Protocol(format!(
                "Tools list failed: {}",
                err.error.message
            ))),
            _ => Err(MCPError::Protocol("Unexpected response type".to_string())),
        }
    }

    /// Shut the server down and close the transport
    pub async fn shutdown(&mut self) -> Result<(), MCPError> {
        let request =
            JSONRPCRequest::new(self.next_request_id(), "shutdown".to_string(), None);
        self.transport.send(&JSONRPCMessage::Request(request)).await?;

        let response: JSONRPCMessage = self.receive_with_timeout().await?;
        match response {
            JSONRPCMessage::Response(_) => {
                self.transport.close().await?;
                Ok(())
            }
            JSONRPCMessage::Error(err) => Err(MCPError::Protocol(format!(
                "Shutdown failed: {}",
                err.error.message
            ))),
            _ => Err(MCPError::Protocol("Unexpected response type".to_string())),
        }
    }

    /// Close the transport without the shutdown round trip
    ///
    /// Used on error paths where the server may no longer answer.
    pub async fn abort(&mut self) -> Result<(), MCPError> {
        self.transport.close().await
    }

    /// Execute a complete session in one call
    ///
    /// Initializes, runs the given closure, then shuts down on every
    /// path; teardown is part of the contract, not optional cleanup.
    pub async fn execute_session<F, R>(&mut self, f: F) -> Result<R, MCPError>
    where
        F: for<'a> FnOnce(&'a mut Self) -> BoxFuture<'a, Result<R, MCPError>> + Send,
        R: Send,
    {
        self.initialize().await?;

        let result = f(self).await;

        match result {
            Ok(value) => {
                self.shutdown().await?;
                Ok(value)
            }
            Err(e) => {
                // The session failed; a best-effort teardown must not
                // mask the original error.
                let _ = self.abort().await;
                Err(e)
            }
        }
    }

    async fn receive_with_timeout<R: DeserializeOwned + Send + Sync>(
        &mut self,
    ) -> Result<R, MCPError> {
        if let Some(duration) = self.timeout_duration {
            match timeout(duration, self.transport.receive::<R>()).await {
                Ok(result) => result,
                Err(_) => Err(MCPError::Timeout(format!(
                    "Operation timed out after {:?}",
                    duration
                ))),
            }
        } else {
            self.transport.receive().await
        }
    }

    fn next_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        RequestId::Number(id)
    }
}
