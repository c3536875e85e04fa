//! Release listing

use super::{per_page, str_field, GitHubTools, RepoRef, ToolResult};
use serde_json::{Map, Value};

impl GitHubTools {
    /// List releases, flagging prereleases and drafts
    pub(super) async fn list_releases(&self, args: &Map<String, Value>) -> ToolResult {
        let repo = RepoRef::from_args(args)?;

        let data = self
            .api
            .get(
                &format!("/repos/{}/{}/releases", repo.owner, repo.name),
                &[("per_page", per_page(args).to_string())],
            )
            .await?;

        let releases = data.as_array().cloned().unwrap_or_default();
        if releases.is_empty() {
            return Ok(vec!["No releases found".to_string()]);
        }

        Ok(releases
            .iter()
            .map(|release| {
                let prerelease = release
                    .get("prerelease")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let draft = release.get("draft").and_then(Value::as_bool).unwrap_or(false);

                format!(
                    "{}{}{} - {}\n  Published: {}\n  URL: {}",
                    if prerelease { "🚧 " } else { "" },
                    if draft { "📝 " } else { "" },
                    str_field(release, "tag_name", ""),
                    str_field(release, "name", ""),
                    str_field(release, "published_at", "N/A"),
                    str_field(release, "html_url", ""),
                )
            })
            .collect())
    }
}
