//! Transport layer for protocol communication
//!
//! A transport moves serialized JSON-RPC messages over a reliable,
//! ordered byte channel. Two implementations exist: [`stdio`] for the
//! server side of a stdio pipe, and [`child`] for a client that owns the
//! server process and speaks over its piped stdio.

pub mod child;
pub mod stdio;

use crate::error::MCPError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Callback invoked with every raw incoming line
pub type MessageCallback = Box<dyn Fn(&str) + Send + Sync>;
/// Callback invoked when a transport operation fails
pub type ErrorCallback = Box<dyn Fn(&MCPError) + Send + Sync>;
/// Callback invoked when the transport is closed
pub type CloseCallback = Box<dyn Fn() + Send + Sync>;

/// Async transport for line-delimited JSON messages
#[async_trait]
pub trait Transport: Send + Sync {
    /// Start the transport
    async fn start(&mut self) -> Result<(), MCPError>;

    /// Send a message
    async fn send<T: Serialize + Send + Sync>(&mut self, message: &T) -> Result<(), MCPError>;

    /// Receive a message
    async fn receive<T: DeserializeOwned + Send + Sync>(&mut self) -> Result<T, MCPError>;

    /// Close the transport; must be safe to call on every exit path
    async fn close(&mut self) -> Result<(), MCPError>;

    /// Set the close callback
    fn set_on_close(&mut self, callback: Option<CloseCallback>);

    /// Set the error callback
    fn set_on_error(&mut self, callback: Option<ErrorCallback>);

    /// Set the raw-message callback
    fn set_on_message<F>(&mut self, callback: Option<F>)
    where
        F: Fn(&str) + Send + Sync + 'static;
}
