//! Tool host: the server side of the protocol
//!
//! The server owns the fixed GitHub tool registry and answers four
//! methods over its transport: `initialize`, `tools/list`, `tools/call`
//! and `shutdown` (plus `ping`). Calls are processed one at a time in
//! arrival order. A failed tool call is still a successful JSON-RPC
//! response; only malformed requests get a JSON-RPC error.
//!
//! ## Example
//!
//! ```rust,no_run
//! use octomcp::{
//!     error::MCPError,
//!     github::GitHubTools,
//!     server::{Server, ServerConfig},
//!     transport::stdio::StdioTransport,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), MCPError> {
//!     let mut server = Server::new(ServerConfig::new(), GitHubTools::from_env());
//!     server.serve(StdioTransport::new()).await
//! }
//! ```

use crate::{
    constants::LATEST_PROTOCOL_VERSION,
    error::MCPError,
    github::GitHubTools,
    schema::{
        client::{CallToolParams, ListToolsResult},
        common::{Implementation, Tool},
        json_rpc::{JSONRPCError, JSONRPCMessage, JSONRPCResponse, RequestId},
        server::{InitializeResult, ServerCapabilities, ToolsCapability},
    },
    transport::Transport,
};
use log::{debug, error, info};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
    /// Advertised tools
    pub tools: Vec<Tool>,
}

impl ServerConfig {
    /// Create a configuration advertising the full GitHub registry
    pub fn new() -> Self {
        Self {
            name: "github-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            tools: GitHubTools::definitions(),
        }
    }

    /// Set the server name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Set the server version
    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize incoming tool arguments to one flat map
///
/// Some callers wrap the argument object one level deep under an
/// `"arguments"` key; this is the single place that unwraps it. Absent
/// arguments become an empty map, never a missing-value fault.
pub fn normalize_arguments(arguments: Option<HashMap<String, Value>>) -> Map<String, Value> {
    let Some(arguments) = arguments else {
        return Map::new();
    };

    if let Some(Value::Object(inner)) = arguments.get("arguments") {
        return inner.clone();
    }

    arguments.into_iter().collect()
}

/// The tool host server
pub struct Server<T: Transport> {
    config: ServerConfig,
    tools: GitHubTools,
    transport: Option<T>,
}

impl<T: Transport> Server<T> {
    /// Create a server around the given registry
    pub fn new(config: ServerConfig, tools: GitHubTools) -> Self {
        Self {
            config,
            tools,
            transport: None,
        }
    }

    /// Run the message loop over the given transport until shutdown
    pub async fn serve(&mut self, mut transport: T) -> Result<(), MCPError> {
        transport.start().await?;
        self.transport = Some(transport);
        self.process_messages().await
    }

    async fn process_messages(&mut self) -> Result<(), MCPError> {
        loop {
            let message = {
                let transport = self
                    .transport
                    .as_mut()
                    .ok_or_else(|| MCPError::Protocol("Transport not initialized".to_string()))?;

                match transport.receive::<JSONRPCMessage>().await {
                    Ok(message) => message,
                    Err(MCPError::Deserialization(e)) => {
                        // A garbled line is recoverable; keep reading.
                        error!("Discarding unparseable message: {}", e);
                        continue;
                    }
                    Err(e) => {
                        info!("Transport ended: {}", e);
                        break;
                    }
                }
            };

            match message {
                JSONRPCMessage::Request(request) => {
                    let id = request.id.clone();

                    match request.method.as_str() {
                        "initialize" => {
                            info!("Received initialization request");
                            self.handle_initialize(id).await?;
                        }
                        "tools/list" => {
                            info!("Received tools list request");
                            self.handle_tools_list(id).await?;
                        }
                        "tools/call" => {
                            self.handle_tools_call(id, request.params).await?;
                        }
                        "ping" => {
                            debug!("Received ping request");
                            self.send_response(id, json!({})).await?;
                        }
                        "shutdown" => {
                            info!("Received shutdown request");
                            self.send_response(id, json!({})).await?;
                            break;
                        }
                        method => {
                            error!("Unknown method: {}", method);
                            self.send_error(id, -32601, format!("Method not found: {}", method))
                                .await?;
                        }
                    }
                }
                JSONRPCMessage::Notification(notification) => {
                    debug!("Received notification: {}", notification.method);
                }
                _ => {
                    error!("Unexpected message type");
                }
            }
        }

        if let Some(transport) = self.transport.as_mut() {
            transport.close().await?;
        }

        Ok(())
    }

    async fn handle_initialize(&mut self, id: RequestId) -> Result<(), MCPError> {
        let init_result = InitializeResult {
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                experimental: None,
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: Implementation {
                name: self.config.name.clone(),
                version: self.config.version.clone(),
            },
            instructions: None,
        };

        self.send_response(id, serde_json::to_value(init_result)?)
            .await
    }

    async fn handle_tools_list(&mut self, id: RequestId) -> Result<(), MCPError> {
        let tools_list = ListToolsResult {
            tools: self.config.tools.clone(),
            next_cursor: None,
        };

        self.send_response(id, serde_json::to_value(tools_list)?)
            .await
    }

    async fn handle_tools_call(
        &mut self,
        id: RequestId,
        params: Option<Value>,
    ) -> Result<(), MCPError> {
        let Some(params) = params else {
            return self
                .send_error(id, -32602, "Missing parameters in tools/call request".to_string())
                .await;
        };

        let call_params: CallToolParams = match serde_json::from_value(params) {
            Ok(call_params) => call_params,
            Err(e) => {
                return self
                    .send_error(id, -32602, format!("Invalid tools/call parameters: {}", e))
                    .await;
            }
        };

        info!("Calling tool '{}'", call_params.name);
        let arguments = normalize_arguments(call_params.arguments);
        let result = self.tools.dispatch(&call_params.name, &arguments).await;

        if result.failed() {
            debug!("Tool '{}' reported failure", call_params.name);
        }

        self.send_response(id, serde_json::to_value(result)?).await
    }

    async fn send_response(&mut self, id: RequestId, result: Value) -> Result<(), MCPError> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| MCPError::Protocol("Transport not initialized".to_string()))?;

        let response = JSONRPCResponse::new(id, result);
        transport.send(&JSONRPCMessage::Response(response)).await
    }

    async fn send_error(
        &mut self,
        id: RequestId,
        code: i32,
        message: String,
    ) -> Result<(), MCPError> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| MCPError::Protocol("Transport not initialized".to_string()))?;

        let error = JSONRPCMessage::Error(JSONRPCError::new_with_details(id, code, message, None));
        transport.send(&error).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::GitHubApi;
    use crate::transport::{CloseCallback, ErrorCallback, Transport};
    use async_trait::async_trait;
    use serde::{de::DeserializeOwned, Serialize};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Feeds queued messages to the server and records what it sends
    struct ScriptedTransport {
        incoming: VecDeque<String>,
        sent: Arc<Mutex<Vec<String>>>,
        closed: Arc<Mutex<bool>>,
    }

    impl ScriptedTransport {
        fn new(incoming: Vec<JSONRPCMessage>) -> Self {
            Self {
                incoming: incoming
                    .into_iter()
                    .map(|m| serde_json::to_string(&m).unwrap())
                    .collect(),
                sent: Arc::new(Mutex::new(Vec::new())),
                closed: Arc::new(Mutex::new(false)),
            }
        }

        fn sent_handle(&self) -> Arc<Mutex<Vec<String>>> {
            self.sent.clone()
        }

        fn closed_handle(&self) -> Arc<Mutex<bool>> {
            self.closed.clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn start(&mut self) -> Result<(), MCPError> {
            Ok(())
        }

        async fn send<M: Serialize + Send + Sync>(&mut self, message: &M) -> Result<(), MCPError> {
            let serialized = serde_json::to_string(message)?;
            self.sent.lock().unwrap().push(serialized);
            Ok(())
        }

        async fn receive<M: DeserializeOwned + Send + Sync>(&mut self) -> Result<M, MCPError> {
            match self.incoming.pop_front() {
                Some(line) => serde_json::from_str(&line).map_err(Into::into),
                None => Err(MCPError::Transport("Input stream closed".to_string())),
            }
        }

        async fn close(&mut self) -> Result<(), MCPError> {
            *self.closed.lock().unwrap() = true;
            Ok(())
        }

        fn set_on_close(&mut self, _callback: Option<CloseCallback>) {}
        fn set_on_error(&mut self, _callback: Option<ErrorCallback>) {}
        fn set_on_message<F>(&mut self, _callback: Option<F>)
        where
            F: Fn(&str) + Send + Sync + 'static,
        {
        }
    }

    fn request(id: i64, method: &str, params: Option<Value>) -> JSONRPCMessage {
        JSONRPCMessage::Request(crate::schema::json_rpc::JSONRPCRequest::new(
            RequestId::Number(id),
            method.to_string(),
            params,
        ))
    }

    fn test_server() -> Server<ScriptedTransport> {
        Server::new(ServerConfig::new(), GitHubTools::new(GitHubApi::new(None)))
    }

    #[test]
    fn arguments_unwrap_one_nesting_level() {
        let mut wrapped = HashMap::new();
        wrapped.insert(
            "arguments".to_string(),
            json!({"username": "octocat"}),
        );
        let normalized = normalize_arguments(Some(wrapped));
        assert_eq!(normalized["username"], json!("octocat"));

        let mut flat = HashMap::new();
        flat.insert("username".to_string(), json!("octocat"));
        let normalized = normalize_arguments(Some(flat));
        assert_eq!(normalized["username"], json!("octocat"));

        assert!(normalize_arguments(None).is_empty());
    }

    #[test]
    fn non_object_arguments_key_is_left_alone() {
        let mut odd = HashMap::new();
        odd.insert("arguments".to_string(), json!("not a map"));
        let normalized = normalize_arguments(Some(odd));
        assert_eq!(normalized["arguments"], json!("not a map"));
    }

    #[tokio::test]
    async fn initialize_then_shutdown() {
        let transport = ScriptedTransport::new(vec![
            request(1, "initialize", None),
            request(2, "shutdown", None),
        ]);
        let sent = transport.sent_handle();
        let closed = transport.closed_handle();

        test_server().serve(transport).await.unwrap();

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 2);

        let init: Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(init["result"]["protocol_version"], json!(LATEST_PROTOCOL_VERSION));
        assert_eq!(init["result"]["server_info"]["name"], json!("github-mcp"));

        assert!(*closed.lock().unwrap(), "transport must close on shutdown");
    }

    #[tokio::test]
    async fn tools_list_advertises_the_registry() {
        let transport = ScriptedTransport::new(vec![
            request(1, "tools/list", None),
            request(2, "shutdown", None),
        ]);
        let sent = transport.sent_handle();

        test_server().serve(transport).await.unwrap();

        let listing: Value = serde_json::from_str(&sent.lock().unwrap()[0]).unwrap();
        let tools = listing["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 18);
        assert!(tools.iter().any(|t| t["name"] == json!("create_branch")));
    }

    #[tokio::test]
    async fn unknown_method_gets_json_rpc_error() {
        let transport = ScriptedTransport::new(vec![
            request(1, "resources/list", None),
            request(2, "shutdown", None),
        ]);
        let sent = transport.sent_handle();

        test_server().serve(transport).await.unwrap();

        let error: Value = serde_json::from_str(&sent.lock().unwrap()[0]).unwrap();
        assert_eq!(error["error"]["code"], json!(-32601));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_flagged_response_not_an_error() {
        let transport = ScriptedTransport::new(vec![
            request(1, "tools/call", Some(json!({"name": "make_coffee"}))),
            request(2, "shutdown", None),
        ]);
        let sent = transport.sent_handle();

        test_server().serve(transport).await.unwrap();

        let response: Value = serde_json::from_str(&sent.lock().unwrap()[0]).unwrap();
        assert!(response.get("error").is_none());
        assert_eq!(response["result"]["is_error"], json!(true));
        assert_eq!(
            response["result"]["content"][0]["text"],
            json!("Unknown tool: make_coffee")
        );
    }

    #[tokio::test]
    async fn eof_without_shutdown_still_closes_the_transport() {
        let transport = ScriptedTransport::new(vec![request(1, "initialize", None)]);
        let closed = transport.closed_handle();

        test_server().serve(transport).await.unwrap();

        assert!(*closed.lock().unwrap());
    }
}
