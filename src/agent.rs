//! Session orchestrator: one text command in, one uniform result out
//!
//! The agent parses a command line, drives a single tool call through a
//! server process, and unwraps the response envelope into an
//! [`AgentResponse`]. Every failure mode — parse, validation,
//! credential, transport, remote, protocol — is recovered where it
//! occurs and converted to the error arm; the caller never sees a fault.
//!
//! The server process is spawned once per agent and calls are serialized
//! against it; [`Agent::run_once`] keeps the spawn-per-call shape for
//! one-shot use, with teardown on every exit path.

use crate::client::Client;
use crate::command::{parse_command, Command};
use crate::error::MCPError;
use crate::schema::server::CallToolResult;
use crate::transport::child::ChildProcessTransport;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;

/// Where to find the tool server and how long to wait for it
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Command to spawn for the server process
    pub server_command: String,
    /// Arguments passed to the server command
    pub server_args: Vec<String>,
    /// Optional per-operation timeout
    pub timeout: Option<Duration>,
}

impl AgentConfig {
    /// Configuration spawning `server_command serve`
    pub fn new(server_command: impl Into<String>) -> Self {
        Self {
            server_command: server_command.into(),
            server_args: vec!["serve".to_string()],
            timeout: None,
        }
    }

    /// Override the server arguments
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.server_args = args;
        self
    }

    /// Set a per-operation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The data arm of a successful response
///
/// A single segment serializes as one string, several as an array, the
/// same two shapes the callers of the original interface consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentData {
    Single(String),
    Many(Vec<String>),
}

/// The uniform result of one agent call: data or one error string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentResponse {
    Error {
        error: String,
    },
    Success {
        success: bool,
        data: AgentData,
        #[serde(skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
    },
}

impl AgentResponse {
    /// The error arm
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// The success arm; multi-segment data carries its count
    pub fn from_segments(mut segments: Vec<String>) -> Self {
        if segments.len() == 1 {
            Self::Success {
                success: true,
                data: AgentData::Single(segments.remove(0)),
                count: None,
            }
        } else {
            Self::Success {
                success: true,
                count: Some(segments.len()),
                data: AgentData::Many(segments),
            }
        }
    }

    /// Whether this is the error arm
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Parse and validate a query before any session work
fn parse_query(query: &str) -> Result<Command, AgentResponse> {
    if query.trim().is_empty() {
        return Err(AgentResponse::error("Empty query"));
    }

    match parse_command(query) {
        Ok(Some(command)) => Ok(command),
        Ok(None) => Err(AgentResponse::error(format!(
            "Invalid command format: {}",
            query
        ))),
        Err(e) => Err(AgentResponse::error(e.to_string())),
    }
}

/// Unwrap a tool result envelope into the uniform response
fn unwrap_result(result: CallToolResult) -> AgentResponse {
    let texts = result.texts();

    if result.failed() {
        let message = texts
            .into_iter()
            .next()
            .unwrap_or_else(|| "Tool reported an error".to_string());
        return AgentResponse::error(message);
    }

    if texts.is_empty() {
        return AgentResponse::error("No results received from server");
    }

    AgentResponse::from_segments(texts)
}

/// A long-lived connection to one spawned server process
///
/// Calls are serialized by the internal lock, preserving the
/// one-request-one-response session semantics per logical call.
pub struct Agent {
    client: Mutex<Client<ChildProcessTransport>>,
}

impl Agent {
    /// Spawn the server and complete the handshake
    pub async fn connect(config: &AgentConfig) -> Result<Self, MCPError> {
        let transport =
            ChildProcessTransport::new(&config.server_command, config.server_args.clone());
        let mut client = Client::new(transport);
        if let Some(timeout) = config.timeout {
            client = client.with_timeout(timeout);
        }

        client.initialize().await?;
        info!("Session initialized");

        Ok(Self {
            client: Mutex::new(client),
        })
    }

    /// Run one command through the live session
    pub async fn run(&self, query: &str) -> AgentResponse {
        let command = match parse_query(query) {
            Ok(command) => command,
            Err(response) => return response,
        };
        debug!("Dispatching tool '{}'", command.tool_name);

        let mut client = self.client.lock().await;
        match client.call_tool(&command.tool_name, command.arguments).await {
            Ok(result) => unwrap_result(result),
            Err(e) => AgentResponse::error(format!("Tool execution failed: {}", e)),
        }
    }

    /// Names of every tool the server advertises
    pub async fn list_tools(&self) -> Result<Vec<String>, MCPError> {
        let mut client = self.client.lock().await;
        let listing = client.list_tools().await?;
        Ok(listing.tools.into_iter().map(|tool| tool.name).collect())
    }

    /// Close the session and reap the server process
    pub async fn shutdown(self) -> Result<(), MCPError> {
        self.client.into_inner().shutdown().await
    }

    /// Run one command in a fresh session: spawn, call, tear down
    ///
    /// Parsing happens before the process is spawned, so malformed input
    /// costs no session work.
    pub async fn run_once(config: &AgentConfig, query: &str) -> AgentResponse {
        let command = match parse_query(query) {
            Ok(command) => command,
            Err(response) => return response,
        };

        let transport =
            ChildProcessTransport::new(&config.server_command, config.server_args.clone());
        let mut client = Client::new(transport);
        if let Some(timeout) = config.timeout {
            client = client.with_timeout(timeout);
        }

        let tool_name = command.tool_name;
        let arguments = command.arguments;
        let outcome = client
            .execute_session(move |client| {
                Box::pin(async move { client.call_tool(&tool_name, arguments).await })
            })
            .await;

        match outcome {
            Ok(result) => unwrap_result(result),
            Err(e) => AgentResponse::error(format!("Server communication failed: {}", e)),
        }
    }
}
