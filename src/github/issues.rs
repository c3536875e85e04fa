//! Issue tools: listing, creation and updates
//!
//! GitHub's issues endpoint also returns pull requests; the listing
//! filters out entries carrying the `pull_request` back-reference.

use super::{optional_str, per_page, required_str, str_field, GitHubTools, RepoRef, ToolError, ToolResult};
use serde_json::{json, Map, Value};

impl GitHubTools {
    /// List issues, excluding pull requests
    pub(super) async fn list_issues(&self, args: &Map<String, Value>) -> ToolResult {
        let repo = RepoRef::from_args(args)?;

        let mut params = vec![
            ("state", optional_str(args, "state").unwrap_or("open").to_string()),
            ("per_page", per_page(args).to_string()),
        ];
        if let Some(labels) = optional_str(args, "labels") {
            params.push(("labels", labels.to_string()));
        }

        let data = self
            .api
            .get(&format!("/repos/{}/{}/issues", repo.owner, repo.name), &params)
            .await?;

        let issues = data.as_array().cloned().unwrap_or_default();
        let segments: Vec<String> = issues
            .iter()
            .filter(|issue| issue.get("pull_request").is_none())
            .map(|issue| {
                let labels: Vec<&str> = issue
                    .get("labels")
                    .and_then(Value::as_array)
                    .map(|labels| {
                        labels
                            .iter()
                            .filter_map(|label| label.get("name").and_then(Value::as_str))
                            .collect()
                    })
                    .unwrap_or_default();
                let labels = if labels.is_empty() {
                    "None".to_string()
                } else {
                    labels.join(", ")
                };

                format!(
                    "#{} - {}\n  State: {} | Labels: {}\n  URL: {}",
                    issue.get("number").and_then(Value::as_i64).unwrap_or(0),
                    str_field(issue, "title", ""),
                    str_field(issue, "state", ""),
                    labels,
                    str_field(issue, "html_url", ""),
                )
            })
            .collect();

        if segments.is_empty() {
            return Ok(vec!["No issues found".to_string()]);
        }
        Ok(segments)
    }

    /// Open a new issue
    pub(super) async fn create_issue(&self, args: &Map<String, Value>) -> ToolResult {
        self.require_token()?;
        let repo = RepoRef::from_args(args)?;
        let title = required_str(args, "title")?;

        let mut body = json!({
            "title": title,
            "body": optional_str(args, "body").unwrap_or(""),
        });
        if let Some(labels) = args.get("labels").filter(|v| v.is_array()) {
            body["labels"] = labels.clone();
        }
        if let Some(assignees) = args.get("assignees").filter(|v| v.is_array()) {
            body["assignees"] = assignees.clone();
        }

        let issue = self
            .api
            .post(
                &format!("/repos/{}/{}/issues", repo.owner, repo.name),
                &body,
                &[200, 201],
            )
            .await?;

        Ok(vec![format!(
            "Issue created: #{} - {}",
            issue.get("number").and_then(Value::as_i64).unwrap_or(0),
            str_field(&issue, "html_url", ""),
        )])
    }

    /// Patch an existing issue; only the supplied fields change
    pub(super) async fn update_issue(&self, args: &Map<String, Value>) -> ToolResult {
        self.require_token()?;
        let repo = RepoRef::from_args(args)?;
        let issue_number = args
            .get("issue_number")
            .and_then(Value::as_i64)
            .ok_or(ToolError::MissingParameter("issue_number"))?;

        let mut body = Map::new();
        if let Some(title) = optional_str(args, "title") {
            body.insert("title".to_string(), Value::from(title));
        }
        if let Some(text) = optional_str(args, "body") {
            body.insert("body".to_string(), Value::from(text));
        }
        if let Some(state) = optional_str(args, "state") {
            body.insert("state".to_string(), Value::from(state));
        }
        if let Some(labels) = args.get("labels").filter(|v| v.is_array()) {
            body.insert("labels".to_string(), labels.clone());
        }

        let issue = self
            .api
            .patch(
                &format!(
                    "/repos/{}/{}/issues/{}",
                    repo.owner, repo.name, issue_number
                ),
                &Value::Object(body),
            )
            .await?;

        Ok(vec![format!(
            "Issue updated: #{} - {}",
            issue.get("number").and_then(Value::as_i64).unwrap_or(0),
            str_field(&issue, "html_url", ""),
        )])
    }
}
