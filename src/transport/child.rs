//! Client-side transport that owns the server process
//!
//! Spawns the configured server command with piped stdio and exchanges
//! line-delimited JSON over the child's stdin/stdout. The child's stderr
//! is drained into the debug log so server-side diagnostics stay visible
//! without touching the protocol channel. The process is reaped on
//! `close()`, and `kill_on_drop` covers callers that abandon an in-flight
//! call without closing.

use crate::error::MCPError;
use crate::transport::{CloseCallback, ErrorCallback, MessageCallback, Transport};
use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Transport over a spawned server process's stdio
pub struct ChildProcessTransport {
    command: String,
    args: Vec<String>,
    child: Option<Child>,
    reader: Option<BufReader<ChildStdout>>,
    writer: Option<ChildStdin>,
    is_connected: bool,
    on_close: Option<CloseCallback>,
    on_error: Option<ErrorCallback>,
    on_message: Option<MessageCallback>,
}

impl ChildProcessTransport {
    /// Create a transport that will spawn `command args…` on start
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            child: None,
            reader: None,
            writer: None,
            is_connected: false,
            on_close: None,
            on_error: None,
            on_message: None,
        }
    }

    fn handle_error(&self, error: &MCPError) {
        if let Some(callback) = &self.on_error {
            callback(error);
        }
    }

    fn not_connected(&self) -> MCPError {
        let error = MCPError::Transport("Transport not connected".to_string());
        self.handle_error(&error);
        error
    }
}

#[async_trait]
impl Transport for ChildProcessTransport {
    async fn start(&mut self) -> Result<(), MCPError> {
        if self.is_connected {
            return Ok(());
        }

        debug!("Spawning server process: {} {:?}", self.command, self.args);
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                let error =
                    MCPError::Transport(format!("Failed to spawn server process: {}", e));
                self.handle_error(&error);
                error
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MCPError::Transport("Failed to open server stdin".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MCPError::Transport("Failed to open server stdout".to_string()))?;

        // Drain server stderr into our debug log.
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("Server stderr: {}", line);
                }
            });
        }

        self.reader = Some(BufReader::new(stdout));
        self.writer = Some(stdin);
        self.child = Some(child);
        self.is_connected = true;
        Ok(())
    }

    async fn send<T: Serialize + Send + Sync>(&mut self, message: &T) -> Result<(), MCPError> {
        if !self.is_connected {
            return Err(self.not_connected());
        }

        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                let error = MCPError::Serialization(e.to_string());
                self.handle_error(&error);
                return Err(error);
            }
        };

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| MCPError::Transport("Server stdin is gone".to_string()))?;

        let result = async {
            writer.write_all(json.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await
        }
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(e) => {
                let error = MCPError::Transport(format!("Failed to write to server: {}", e));
                self.handle_error(&error);
                Err(error)
            }
        }
    }

    async fn receive<T: DeserializeOwned + Send + Sync>(&mut self) -> Result<T, MCPError> {
        if !self.is_connected {
            return Err(self.not_connected());
        }

        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| MCPError::Transport("Server stdout is gone".to_string()))?;

        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                let error = MCPError::Transport("Server closed the connection".to_string());
                self.handle_error(&error);
                Err(error)
            }
            Ok(_) => {
                if let Some(callback) = &self.on_message {
                    callback(&line);
                }

                match serde_json::from_str(&line) {
                    Ok(parsed) => Ok(parsed),
                    Err(e) => {
                        let error = MCPError::Deserialization(e.to_string());
                        self.handle_error(&error);
                        Err(error)
                    }
                }
            }
            Err(e) => {
                let error = MCPError::Transport(format!("Failed to read from server: {}", e));
                self.handle_error(&error);
                Err(error)
            }
        }
    }

    async fn close(&mut self) -> Result<(), MCPError> {
        if !self.is_connected {
            return Ok(());
        }

        self.is_connected = false;

        // Closing stdin signals the server to wind down; kill covers the
        // case where it does not.
        self.writer = None;
        self.reader = None;

        if let Some(mut child) = self.child.take() {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }

        if let Some(callback) = &self.on_close {
            callback();
        }

        Ok(())
    }

    fn set_on_close(&mut self, callback: Option<CloseCallback>) {
        self.on_close = callback;
    }

    fn set_on_error(&mut self, callback: Option<ErrorCallback>) {
        self.on_error = callback;
    }

    fn set_on_message<F>(&mut self, callback: Option<F>)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_message = callback.map(|f| Box::new(f) as Box<dyn Fn(&str) + Send + Sync>);
    }
}
