//! Repository tools: listing, details, search, creation and forking

use super::{
    num_field, optional_str, per_page, required_str, str_field, GitHubTools, RepoRef, ToolResult,
};
use serde_json::{json, Map, Value};

impl GitHubTools {
    /// List all public repositories for a username
    pub(super) async fn list_repositories(&self, args: &Map<String, Value>) -> ToolResult {
        let username = required_str(args, "username")?;

        let data = self
            .api
            .get(
                &format!("/users/{}/repos", username),
                &[("per_page", "100".to_string())],
            )
            .await?;

        let repos = data.as_array().cloned().unwrap_or_default();
        if repos.is_empty() {
            return Ok(vec!["No repositories found".to_string()]);
        }

        Ok(repos
            .iter()
            .map(|repo| {
                format!(
                    "{} ({}) - ⭐ {} - {}",
                    str_field(repo, "full_name", ""),
                    str_field(repo, "visibility", "public"),
                    num_field(repo, "stargazers_count"),
                    str_field(repo, "description", "No description"),
                )
            })
            .collect())
    }

    /// Detailed one-repository summary
    pub(super) async fn get_repo_details(&self, args: &Map<String, Value>) -> ToolResult {
        let repo = RepoRef::from_args(args)?;

        let data = self
            .api
            .get(&format!("/repos/{}/{}", repo.owner, repo.name), &[])
            .await?;

        let private = data.get("private").and_then(Value::as_bool).unwrap_or(false);
        let details = format!(
            "Repository: {}\n\
             Description: {}\n\
             Private: {}\n\
             URL: {}\n\
             Stars: ⭐ {}\n\
             Forks: 🔱 {}\n\
             Open Issues: {}\n\
             Language: {}\n\
             Created: {}\n\
             Updated: {}\n\
             Default Branch: {}",
            str_field(&data, "full_name", ""),
            str_field(&data, "description", "No description"),
            private,
            str_field(&data, "html_url", ""),
            num_field(&data, "stargazers_count"),
            num_field(&data, "forks_count"),
            num_field(&data, "open_issues_count"),
            str_field(&data, "language", "N/A"),
            str_field(&data, "created_at", ""),
            str_field(&data, "updated_at", ""),
            str_field(&data, "default_branch", ""),
        );

        Ok(vec![details])
    }

    /// Search repositories; header segment then one block per hit
    pub(super) async fn search_repositories(&self, args: &Map<String, Value>) -> ToolResult {
        let query = required_str(args, "query")?;

        let mut params = vec![
            ("q", query.to_string()),
            ("per_page", per_page(args).to_string()),
        ];
        if let Some(sort) = optional_str(args, "sort") {
            params.push(("sort", sort.to_string()));
        }
        if let Some(order) = optional_str(args, "order") {
            params.push(("order", order.to_string()));
        }

        let data = self.api.get("/search/repositories", &params).await?;

        let items = data
            .get("items")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if items.is_empty() {
            return Ok(vec!["No repositories found".to_string()]);
        }

        let total = num_field(&data, "total_count");
        let mut segments = vec![format!(
            "Found {} repositories (showing {}):",
            total,
            items.len()
        )];
        segments.extend(items.iter().map(|repo| {
            format!(
                "{} - ⭐ {} - {}",
                str_field(repo, "full_name", ""),
                num_field(repo, "stargazers_count"),
                str_field(repo, "description", "No description"),
            )
        }));

        Ok(segments)
    }

    /// Create a repository for the authenticated user
    pub(super) async fn create_repository(&self, args: &Map<String, Value>) -> ToolResult {
        self.require_token()?;
        let name = required_str(args, "name")?;

        let body = json!({
            "name": name,
            "description": optional_str(args, "description").unwrap_or(""),
            "private": args.get("private").and_then(Value::as_bool).unwrap_or(false),
            "auto_init": args.get("auto_init").and_then(Value::as_bool).unwrap_or(true),
        });

        let repo = self.api.post("/user/repos", &body, &[200, 201]).await?;

        Ok(vec![format!(
            "Repository created: {}",
            str_field(&repo, "html_url", "")
        )])
    }

    /// Fork a repository into the authenticated user's account
    pub(super) async fn fork_repository(&self, args: &Map<String, Value>) -> ToolResult {
        self.require_token()?;
        let repo = RepoRef::from_args(args)?;

        // Forking is asynchronous on GitHub's side, hence the 202.
        let fork = self
            .api
            .post(
                &format!("/repos/{}/{}/forks", repo.owner, repo.name),
                &json!({}),
                &[200, 202],
            )
            .await?;

        Ok(vec![format!(
            "Repository forked: {}",
            str_field(&fork, "html_url", "")
        )])
    }
}
