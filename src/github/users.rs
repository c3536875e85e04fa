//! User profile lookup

use super::{num_field, required_str, str_field, GitHubTools, ToolResult};
use serde_json::{Map, Value};

impl GitHubTools {
    /// One-user profile summary
    pub(super) async fn get_user_info(&self, args: &Map<String, Value>) -> ToolResult {
        let username = required_str(args, "username")?;

        let user = self.api.get(&format!("/users/{}", username), &[]).await?;

        let info = format!(
            "Username: {}\n\
             Name: {}\n\
             Bio: {}\n\
             Company: {}\n\
             Location: {}\n\
             Email: {}\n\
             Blog: {}\n\
             Public Repos: {}\n\
             Followers: {}\n\
             Following: {}\n\
             Created: {}\n\
             Profile: {}",
            str_field(&user, "login", ""),
            str_field(&user, "name", "N/A"),
            str_field(&user, "bio", "N/A"),
            str_field(&user, "company", "N/A"),
            str_field(&user, "location", "N/A"),
            str_field(&user, "email", "N/A"),
            str_field(&user, "blog", "N/A"),
            num_field(&user, "public_repos"),
            num_field(&user, "followers"),
            num_field(&user, "following"),
            str_field(&user, "created_at", ""),
            str_field(&user, "html_url", ""),
        );

        Ok(vec![info])
    }
}
