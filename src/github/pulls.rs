//! Pull request tools: listing and creation

use super::{optional_str, per_page, required_str, str_field, GitHubTools, RepoRef, ToolResult};
use serde_json::{json, Map, Value};

impl GitHubTools {
    /// List pull requests for a repository
    pub(super) async fn list_pull_requests(&self, args: &Map<String, Value>) -> ToolResult {
        let repo = RepoRef::from_args(args)?;

        let params = vec![
            ("state", optional_str(args, "state").unwrap_or("open").to_string()),
            ("per_page", per_page(args).to_string()),
        ];

        let data = self
            .api
            .get(&format!("/repos/{}/{}/pulls", repo.owner, repo.name), &params)
            .await?;

        let pulls = data.as_array().cloned().unwrap_or_default();
        if pulls.is_empty() {
            return Ok(vec!["No pull requests found".to_string()]);
        }

        Ok(pulls
            .iter()
            .map(|pr| {
                let head = pr
                    .get("head")
                    .map(|head| str_field(head, "ref", "").to_string())
                    .unwrap_or_default();
                let base = pr
                    .get("base")
                    .map(|base| str_field(base, "ref", "").to_string())
                    .unwrap_or_default();
                let draft = pr.get("draft").and_then(Value::as_bool).unwrap_or(false);

                format!(
                    "#{} - {}\n  {} → {}\n  State: {} | Draft: {}\n  URL: {}",
                    pr.get("number").and_then(Value::as_i64).unwrap_or(0),
                    str_field(pr, "title", ""),
                    head,
                    base,
                    str_field(pr, "state", ""),
                    draft,
                    str_field(pr, "html_url", ""),
                )
            })
            .collect())
    }

    /// Open a pull request from `head` into `base`
    pub(super) async fn create_pull_request(&self, args: &Map<String, Value>) -> ToolResult {
        self.require_token()?;
        let repo = RepoRef::from_args(args)?;
        let title = required_str(args, "title")?;
        let head = required_str(args, "head")?;
        let base = required_str(args, "base")?;

        let body = json!({
            "title": title,
            "head": head,
            "base": base,
            "body": optional_str(args, "body").unwrap_or(""),
            "draft": args.get("draft").and_then(Value::as_bool).unwrap_or(false),
        });

        let pr = self
            .api
            .post(
                &format!("/repos/{}/{}/pulls", repo.owner, repo.name),
                &body,
                &[200, 201],
            )
            .await?;

        Ok(vec![format!(
            "Pull request created: #{} - {}",
            pr.get("number").and_then(Value::as_i64).unwrap_or(0),
            str_field(&pr, "html_url", ""),
        )])
    }
}
