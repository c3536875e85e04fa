//! Server-side transport over the process's own stdin/stdout
//!
//! Stdout carries only protocol messages; logging goes to stderr. Writes
//! funnel through a dedicated task so interleaved sends never corrupt the
//! line framing.

use crate::error::MCPError;
use crate::transport::{CloseCallback, ErrorCallback, MessageCallback, Transport};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Standard IO transport
pub struct StdioTransport {
    reader: BufReader<Box<dyn tokio::io::AsyncRead + Send + Sync + Unpin>>,
    writer_tx: mpsc::Sender<String>,
    is_connected: bool,
    on_close: Option<CloseCallback>,
    on_error: Option<ErrorCallback>,
    on_message: Option<MessageCallback>,
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl StdioTransport {
    /// Create a new stdio transport using stdin and stdout
    pub fn new() -> Self {
        let (writer_tx, mut writer_rx) = mpsc::channel::<String>(32);

        // One writer task owns stdout; each queued message becomes one line.
        tokio::spawn(async move {
            let mut writer = tokio::io::BufWriter::new(tokio::io::stdout());
            while let Some(message) = writer_rx.recv().await {
                if let Err(e) = writer.write_all(message.as_bytes()).await {
                    log::error!("Error writing to stdout: {}", e);
                }
                if let Err(e) = writer.write_all(b"\n").await {
                    log::error!("Error writing newline to stdout: {}", e);
                }
                if let Err(e) = writer.flush().await {
                    log::error!("Error flushing stdout: {}", e);
                }
            }
        });

        Self {
            reader: BufReader::new(Box::new(tokio::io::stdin())),
            writer_tx,
            is_connected: false,
            on_close: None,
            on_error: None,
            on_message: None,
        }
    }

    /// Create a stdio transport reading from a custom source (tests)
    pub fn with_reader(reader: Box<dyn tokio::io::AsyncRead + Send + Sync + Unpin>) -> Self {
        let mut transport = Self::new();
        transport.reader = BufReader::new(reader);
        transport
    }

    fn handle_error(&self, error: &MCPError) {
        if let Some(callback) = &self.on_error {
            callback(error);
        }
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn start(&mut self) -> Result<(), MCPError> {
        self.is_connected = true;
        Ok(())
    }

    async fn send<T: Serialize + Send + Sync>(&mut self, message: &T) -> Result<(), MCPError> {
        if !self.is_connected {
            let error = MCPError::Transport("Transport not connected".to_string());
            self.handle_error(&error);
            return Err(error);
        }

        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                let error = MCPError::Serialization(e.to_string());
                self.handle_error(&error);
                return Err(error);
            }
        };

        match self.writer_tx.send(json).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let error = MCPError::Transport(format!("Failed to queue message: {}", e));
                self.handle_error(&error);
                Err(error)
            }
        }
    }

    async fn receive<T: DeserializeOwned + Send + Sync>(&mut self) -> Result<T, MCPError> {
        if !self.is_connected {
            let error = MCPError::Transport("Transport not connected".to_string());
            self.handle_error(&error);
            return Err(error);
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line).await {
            Ok(0) => {
                let error = MCPError::Transport("Input stream closed".to_string());
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
                let error = MCPError::Transport(format!("Failed to read: {}", e));
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, serde::Deserialize, serde::Serialize, PartialEq)]
    struct TestMessage {
        id: u32,
        jsonrpc: String,
        method: String,
    }

    #[tokio::test]
    async fn receive_parses_a_line() {
        let input = "{\"id\":1,\"jsonrpc\":\"2.0\",\"method\":\"ping\"}\n".to_string();
        let mut transport = StdioTransport::with_reader(Box::new(Cursor::new(input)));

        transport.start().await.unwrap();
        let message: TestMessage = transport.receive().await.unwrap();

        assert_eq!(message.id, 1);
        assert_eq!(message.method, "ping");

        transport.close().await.unwrap();
        assert!(!transport.is_connected);
    }

    #[tokio::test]
    async fn eof_is_a_transport_error() {
        let mut transport = StdioTransport::with_reader(Box::new(Cursor::new(String::new())));
        transport.start().await.unwrap();

        let error_seen = Arc::new(Mutex::new(false));
        let flag = error_seen.clone();
        transport.set_on_error(Some(Box::new(move |_| {
            *flag.lock().unwrap() = true;
        })));

        let result: Result<TestMessage, MCPError> = transport.receive().await;
        assert!(matches!(result, Err(MCPError::Transport(_))));
        assert!(*error_seen.lock().unwrap());
    }

    #[tokio::test]
    async fn receive_before_start_fails() {
        let mut transport = StdioTransport::with_reader(Box::new(Cursor::new(String::new())));
        let result: Result<TestMessage, MCPError> = transport.receive().await;
        assert!(result.is_err());
    }
}
