//! Code search

use super::{num_field, per_page, required_str, str_field, GitHubTools, ToolResult};
use serde_json::{Map, Value};

impl GitHubTools {
    /// Search code across repositories
    pub(super) async fn search_code(&self, args: &Map<String, Value>) -> ToolResult {
        let query = required_str(args, "query")?;

        let params = vec![
            ("q", query.to_string()),
            ("per_page", per_page(args).to_string()),
        ];

        let data = self.api.get("/search/code", &params).await?;

        let items = data
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if items.is_empty() {
            return Ok(vec!["No code results found".to_string()]);
        }

        let total = num_field(&data, "total_count");
        let mut segments = vec![format!(
            "Found {} code results (showing {}):",
            total,
            items.len()
        )];
        segments.extend(items.iter().map(|item| {
            let repo = item
                .get("repository")
                .map(|repo| str_field(repo, "full_name", "").to_string())
                .unwrap_or_default();

            format!(
                "{}/{}\n  URL: {}",
                repo,
                str_field(item, "path", ""),
                str_field(item, "html_url", ""),
            )
        }));

        Ok(segments)
    }
}
