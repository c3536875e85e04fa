//! File content tools
//!
//! The contents endpoint carries file bodies base64-encoded, with
//! line breaks inside the encoding; those are stripped before decoding.

use super::{optional_str, required_str, str_field, GitHubTools, RepoRef, ToolError, ToolResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Map, Value};

impl GitHubTools {
    /// Read a file from a repository, decoded to text
    pub(super) async fn get_file_contents(&self, args: &Map<String, Value>) -> ToolResult {
        let repo = RepoRef::from_args(args)?;
        let path = required_str(args, "path")?;

        let mut params = Vec::new();
        if let Some(branch) = optional_str(args, "branch") {
            params.push(("ref", branch.to_string()));
        }

        let data = self
            .api
            .get(
                &format!("/repos/{}/{}/contents/{}", repo.owner, repo.name, path),
                &params,
            )
            .await?;

        let encoded: String = str_field(&data, "content", "")
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| ToolError::InvalidContent(e.to_string()))?;
        let content =
            String::from_utf8(bytes).map_err(|e| ToolError::InvalidContent(e.to_string()))?;

        Ok(vec![format!(
            "File: {}\nSize: {} bytes\nSHA: {}\n\n{}",
            path,
            data.get("size").and_then(Value::as_i64).unwrap_or(0),
            str_field(&data, "sha", ""),
            content,
        )])
    }

    /// Create or update a file through the contents endpoint
    ///
    /// An update is an upload carrying the current blob `sha`; without it
    /// GitHub treats the call as a create.
    pub(super) async fn create_or_update_file(&self, args: &Map<String, Value>) -> ToolResult {
        self.require_token()?;
        let repo = RepoRef::from_args(args)?;
        let path = required_str(args, "path")?;
        let content = required_str(args, "content")?;
        let message = required_str(args, "message")?;
        let branch = required_str(args, "branch")?;

        let mut body = json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
            "branch": branch,
        });
        let sha = optional_str(args, "sha");
        if let Some(sha) = sha {
            body["sha"] = Value::from(sha);
        }

        let result = self
            .api
            .put(
                &format!("/repos/{}/{}/contents/{}", repo.owner, repo.name, path),
                &body,
                &[200, 201],
            )
            .await?;

        let url = result
            .get("content")
            .map(|content| str_field(content, "html_url", "").to_string())
            .unwrap_or_default();

        Ok(vec![format!(
            "File {}: {}",
            if sha.is_some() { "updated" } else { "created" },
            url,
        )])
    }
}
