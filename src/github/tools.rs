//! Definitions of the registered tools: name, description and input shape

use crate::schema::common::{Tool, ToolInputSchema};
use serde_json::{json, Value};
use std::collections::HashMap;

fn tool(name: &str, description: &str, properties: Value, required: &[&str]) -> Tool {
    let properties: HashMap<String, Value> = match properties {
        Value::Object(map) => map.into_iter().collect(),
        _ => HashMap::new(),
    };

    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: ToolInputSchema {
            r#type: "object".to_string(),
            properties: Some(properties),
            required: Some(required.iter().map(|s| s.to_string()).collect()),
        },
    }
}

/// All tools exposed by the server, in registry order
pub fn definitions() -> Vec<Tool> {
    vec![
        tool(
            "list_repositories",
            "List all public repositories for a given GitHub username",
            json!({"username": {"type": "string"}}),
            &["username"],
        ),
        tool(
            "get_repo_details",
            "Get detailed information for a repository (owner/repo)",
            json!({"repo": {"type": "string"}}),
            &["repo"],
        ),
        tool(
            "search_repositories",
            "Search for repositories on GitHub",
            json!({
                "query": {"type": "string"},
                "sort": {"type": "string", "enum": ["stars", "forks", "updated"]},
                "order": {"type": "string", "enum": ["asc", "desc"], "default": "desc"},
                "per_page": {"type": "integer", "default": 30, "maximum": 100}
            }),
            &["query"],
        ),
        tool(
            "create_repository",
            "Create a new repository for the authenticated user",
            json!({
                "name": {"type": "string"},
                "description": {"type": "string"},
                "private": {"type": "boolean", "default": false},
                "auto_init": {"type": "boolean", "default": true}
            }),
            &["name"],
        ),
        tool(
            "fork_repository",
            "Fork a repository",
            json!({"repo": {"type": "string"}}),
            &["repo"],
        ),
        tool(
            "list_issues",
            "List issues for a repository with optional filtering",
            json!({
                "repo": {"type": "string", "description": "Repository in format owner/repo"},
                "state": {"type": "string", "enum": ["open", "closed", "all"], "default": "open"},
                "labels": {"type": "string", "description": "Comma-separated list of labels"},
                "per_page": {"type": "integer", "default": 30, "maximum": 100}
            }),
            &["repo"],
        ),
        tool(
            "create_issue",
            "Create a new issue in a repository",
            json!({
                "repo": {"type": "string"},
                "title": {"type": "string"},
                "body": {"type": "string"},
                "labels": {"type": "array", "items": {"type": "string"}},
                "assignees": {"type": "array", "items": {"type": "string"}}
            }),
            &["repo", "title"],
        ),
        tool(
            "update_issue",
            "Update an existing issue",
            json!({
                "repo": {"type": "string"},
                "issue_number": {"type": "integer"},
                "title": {"type": "string"},
                "body": {"type": "string"},
                "state": {"type": "string", "enum": ["open", "closed"]},
                "labels": {"type": "array", "items": {"type": "string"}}
            }),
            &["repo", "issue_number"],
        ),
        tool(
            "list_pull_requests",
            "List pull requests for a repository",
            json!({
                "repo": {"type": "string"},
                "state": {"type": "string", "enum": ["open", "closed", "all"], "default": "open"},
                "per_page": {"type": "integer", "default": 30, "maximum": 100}
            }),
            &["repo"],
        ),
        tool(
            "create_pull_request",
            "Create a new pull request",
            json!({
                "repo": {"type": "string"},
                "title": {"type": "string"},
                "head": {"type": "string", "description": "Branch containing changes"},
                "base": {"type": "string", "description": "Branch to merge into"},
                "body": {"type": "string"},
                "draft": {"type": "boolean", "default": false}
            }),
            &["repo", "title", "head", "base"],
        ),
        tool(
            "get_file_contents",
            "Get contents of a file from a repository",
            json!({
                "repo": {"type": "string"},
                "path": {"type": "string", "description": "Path to file in repository"},
                "branch": {"type": "string", "description": "Branch name (default: main)"}
            }),
            &["repo", "path"],
        ),
        tool(
            "create_or_update_file",
            "Create or update a file in a repository",
            json!({
                "repo": {"type": "string"},
                "path": {"type": "string"},
                "content": {"type": "string"},
                "message": {"type": "string", "description": "Commit message"},
                "branch": {"type": "string"},
                "sha": {"type": "string", "description": "SHA of file to update (for updates only)"}
            }),
            &["repo", "path", "content", "message", "branch"],
        ),
        tool(
            "list_branches",
            "List all branches in a repository",
            json!({
                "repo": {"type": "string"},
                "per_page": {"type": "integer", "default": 30, "maximum": 100}
            }),
            &["repo"],
        ),
        tool(
            "create_branch",
            "Create a new branch in a repository",
            json!({
                "repo": {"type": "string"},
                "branch": {"type": "string", "description": "Name of new branch"},
                "from_branch": {"type": "string", "description": "Source branch (default: main)"}
            }),
            &["repo", "branch"],
        ),
        tool(
            "list_commits",
            "List commits in a repository",
            json!({
                "repo": {"type": "string"},
                "branch": {"type": "string", "description": "Branch name"},
                "per_page": {"type": "integer", "default": 30, "maximum": 100}
            }),
            &["repo"],
        ),
        tool(
            "search_code",
            "Search for code in repositories",
            json!({
                "query": {"type": "string"},
                "per_page": {"type": "integer", "default": 30, "maximum": 100}
            }),
            &["query"],
        ),
        tool(
            "list_releases",
            "List releases for a repository",
            json!({
                "repo": {"type": "string"},
                "per_page": {"type": "integer", "default": 30, "maximum": 100}
            }),
            &["repo"],
        ),
        tool(
            "get_user_info",
            "Get information about a GitHub user",
            json!({"username": {"type": "string"}}),
            &["username"],
        ),
    ]
}
