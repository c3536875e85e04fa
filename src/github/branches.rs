//! Branch tools: listing and creation
//!
//! Branch creation is a two-step dependent operation: resolve the source
//! branch's commit first, then create the new ref from that exact sha.
//! If the lookup fails, the creation call is never issued.

use super::{optional_str, per_page, required_str, str_field, GitHubTools, RepoRef, ToolError, ToolResult};
use serde_json::{json, Map, Value};

impl GitHubTools {
    /// List branches, flagging protected ones
    pub(super) async fn list_branches(&self, args: &Map<String, Value>) -> ToolResult {
        let repo = RepoRef::from_args(args)?;

        let data = self
            .api
            .get(
                &format!("/repos/{}/{}/branches", repo.owner, repo.name),
                &[("per_page", per_page(args).to_string())],
            )
            .await?;

        let branches = data.as_array().cloned().unwrap_or_default();
        if branches.is_empty() {
            return Ok(vec!["No branches found".to_string()]);
        }

        Ok(branches
            .iter()
            .map(|branch| {
                let protected = branch
                    .get("protected")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let sha = branch
                    .get("commit")
                    .map(|commit| str_field(commit, "sha", "").to_string())
                    .unwrap_or_default();
                let short = sha.get(..7).unwrap_or(&sha);

                format!(
                    "{}{} (SHA: {})",
                    if protected { "🔒 " } else { "" },
                    str_field(branch, "name", ""),
                    short,
                )
            })
            .collect())
    }

    /// Create a branch from `from_branch` (default `main`)
    pub(super) async fn create_branch(&self, args: &Map<String, Value>) -> ToolResult {
        self.require_token()?;
        let repo = RepoRef::from_args(args)?;
        let branch = required_str(args, "branch")?;
        let from_branch = optional_str(args, "from_branch").unwrap_or("main");

        let source = self
            .api
            .get(
                &format!(
                    "/repos/{}/{}/git/ref/heads/{}",
                    repo.owner, repo.name, from_branch
                ),
                &[],
            )
            .await?;

        let sha = source
            .get("object")
            .and_then(|object| object.get("sha"))
            .and_then(Value::as_str)
            .ok_or(ToolError::UnexpectedResponse("object.sha"))?;

        self.api
            .post(
                &format!("/repos/{}/{}/git/refs", repo.owner, repo.name),
                &json!({
                    "ref": format!("refs/heads/{}", branch),
                    "sha": sha,
                }),
                &[200, 201],
            )
            .await?;

        Ok(vec![format!(
            "Branch '{}' created from '{}'",
            branch, from_branch
        )])
    }
}
