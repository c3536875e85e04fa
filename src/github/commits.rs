//! Commit listing

use super::{optional_str, per_page, str_field, GitHubTools, RepoRef, ToolResult};
use serde_json::{Map, Value};

impl GitHubTools {
    /// List commits, optionally scoped to a branch
    pub(super) async fn list_commits(&self, args: &Map<String, Value>) -> ToolResult {
        let repo = RepoRef::from_args(args)?;

        let mut params = vec![("per_page", per_page(args).to_string())];
        if let Some(branch) = optional_str(args, "branch") {
            // The commits endpoint names its branch filter `sha`.
            params.push(("sha", branch.to_string()));
        }

        let data = self
            .api
            .get(&format!("/repos/{}/{}/commits", repo.owner, repo.name), &params)
            .await?;

        let commits = data.as_array().cloned().unwrap_or_default();
        if commits.is_empty() {
            return Ok(vec!["No commits found".to_string()]);
        }

        Ok(commits
            .iter()
            .map(|commit| {
                let sha = str_field(commit, "sha", "");
                let short = sha.get(..7).unwrap_or(sha);
                let detail = commit.get("commit").cloned().unwrap_or(Value::Null);
                let message = str_field(&detail, "message", "");
                let subject = message.lines().next().unwrap_or("");
                let author = detail.get("author").cloned().unwrap_or(Value::Null);

                format!(
                    "{} - {}\n  by {} on {}",
                    short,
                    subject,
                    str_field(&author, "name", ""),
                    str_field(&author, "date", ""),
                )
            })
            .collect())
    }
}
