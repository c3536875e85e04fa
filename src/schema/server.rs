//! Response payloads sent by the server

use crate::schema::common::{Implementation, TextContent};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of the `initialize` handshake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Capabilities advertised by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tool-related capability flags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCapability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

/// Result of a `tools/call` request
///
/// Tool failures are part of this result, not a JSON-RPC error: the
/// `is_error` flag discriminates a failed call whose message travels in
/// `content`. This keeps error and data in one envelope without sentinel
/// markers inside the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<ToolResultContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    /// Build a successful result, one content item per text segment
    pub fn success(segments: Vec<String>) -> Self {
        Self {
            content: segments
                .into_iter()
                .map(|text| ToolResultContent::Text(TextContent::new(text)))
                .collect(),
            is_error: None,
        }
    }

    /// Build a failed result carrying a single error message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolResultContent::Text(TextContent::new(message))],
            is_error: Some(true),
        }
    }

    /// Whether this result is flagged as a tool failure
    pub fn failed(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// The text of every content item, in order
    pub fn texts(&self) -> Vec<String> {
        self.content
            .iter()
            .map(|item| match item {
                ToolResultContent::Text(text) => text.text.clone(),
            })
            .collect()
    }
}

/// One content item of a tool result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(TextContent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_sets_discriminator() {
        let result = CallToolResult::failure("Invalid repo format. Use 'owner/repo'");
        assert!(result.failed());
        assert_eq!(
            result.texts(),
            vec!["Invalid repo format. Use 'owner/repo'".to_string()]
        );
    }

    #[test]
    fn success_omits_discriminator_on_the_wire() {
        let result = CallToolResult::success(vec!["one".to_string(), "two".to_string()]);
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("is_error").is_none());
        assert_eq!(value["content"].as_array().unwrap().len(), 2);
    }
}
