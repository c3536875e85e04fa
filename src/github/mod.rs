//! GitHub tool registry and dispatch
//!
//! Eighteen tools, each a direct pass-through to one REST endpoint:
//! extract and validate arguments, issue the call, render the JSON
//! response as text segments. Dispatch is an exact-name static match;
//! an unknown name is a failure value, never a fault.

pub mod api;
mod branches;
mod commits;
mod content;
mod issues;
mod pulls;
mod releases;
mod repos;
mod search;
mod tools;
mod users;

pub use api::{ApiError, GitHubApi};

use crate::schema::common::Tool;
use crate::schema::server::CallToolResult;
use serde_json::{Map, Value};
use thiserror::Error;

/// Failures a tool handler can produce
///
/// Every variant renders to the single human-readable message the caller
/// sees; none of them propagate as faults.
#[derive(Error, Debug, Clone)]
pub enum ToolError {
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),

    #[error("Invalid repo format. Use 'owner/repo'")]
    InvalidRepoFormat,

    #[error("GitHub token required for this operation")]
    CredentialRequired,

    #[error("Failed to decode file content: {0}")]
    InvalidContent(String),

    #[error("Unexpected response from GitHub: missing {0}")]
    UnexpectedResponse(&'static str),

    #[error("{0}")]
    Api(#[from] ApiError),
}

/// A handler outcome: ordered text segments, or one error
pub type ToolResult = Result<Vec<String>, ToolError>;

/// Split an `owner/name` token into its two parts
///
/// Empty input yields `(None, None)`. Exactly one `/` splits into owner
/// and name. Zero or more than one `/` treats the whole string as a bare
/// repository name with no owner; operations that need both parts reject
/// the reference when the owner is unset.
pub fn split_owner_repo(input: &str) -> (Option<String>, Option<String>) {
    if input.is_empty() {
        return (None, None);
    }
    let parts: Vec<&str> = input.split('/').collect();
    if parts.len() == 2 {
        (Some(parts[0].to_string()), Some(parts[1].to_string()))
    } else {
        (None, Some(input.to_string()))
    }
}

/// A validated repository reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse a `repo` argument into a validated reference
    pub fn parse(raw: &str) -> Result<Self, ToolError> {
        match split_owner_repo(raw) {
            (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
                Ok(Self { owner, name })
            }
            _ => Err(ToolError::InvalidRepoFormat),
        }
    }

    /// Parse the `repo` argument out of a tool argument map
    fn from_args(args: &Map<String, Value>) -> Result<Self, ToolError> {
        Self::parse(optional_str(args, "repo").unwrap_or_default())
    }
}

/// The fixed GitHub tool registry
///
/// Owns the remote call executor; handlers live in the per-group
/// submodules and share the same skeleton: validate, gate on the token
/// for mutating operations, one outbound call, render.
#[derive(Debug, Clone)]
pub struct GitHubTools {
    api: GitHubApi,
}

impl GitHubTools {
    /// Create the registry around the given executor
    pub fn new(api: GitHubApi) -> Self {
        Self { api }
    }

    /// Create the registry with the token taken from the environment
    pub fn from_env() -> Self {
        Self::new(GitHubApi::from_env())
    }

    /// The executor, mainly for startup reporting
    pub fn api(&self) -> &GitHubApi {
        &self.api
    }

    /// Definitions of every registered tool, for discovery
    pub fn definitions() -> Vec<Tool> {
        tools::definitions()
    }

    /// Invoke a tool by exact name
    ///
    /// Unknown names and handler failures both come back as a flagged
    /// [`CallToolResult`]; this never returns an error.
    pub async fn dispatch(&self, name: &str, args: &Map<String, Value>) -> CallToolResult {
        let outcome = match name {
            "list_repositories" => self.list_repositories(args).await,
            "get_repo_details" => self.get_repo_details(args).await,
            "search_repositories" => self.search_repositories(args).await,
            "create_repository" => self.create_repository(args).await,
            "fork_repository" => self.fork_repository(args).await,
            "list_issues" => self.list_issues(args).await,
            "create_issue" => self.create_issue(args).await,
            "update_issue" => self.update_issue(args).await,
            "list_pull_requests" => self.list_pull_requests(args).await,
            "create_pull_request" => self.create_pull_request(args).await,
            "get_file_contents" => self.get_file_contents(args).await,
            "create_or_update_file" => self.create_or_update_file(args).await,
            "list_branches" => self.list_branches(args).await,
            "create_branch" => self.create_branch(args).await,
            "list_commits" => self.list_commits(args).await,
            "search_code" => self.search_code(args).await,
            "list_releases" => self.list_releases(args).await,
            "get_user_info" => self.get_user_info(args).await,
            _ => return CallToolResult::failure(format!("Unknown tool: {}", name)),
        };

        match outcome {
            Ok(segments) => CallToolResult::success(segments),
            Err(error) => CallToolResult::failure(error.to_string()),
        }
    }

    /// Mutating operations fail closed without a configured token
    fn require_token(&self) -> Result<(), ToolError> {
        if self.api.has_token() {
            Ok(())
        } else {
            Err(ToolError::CredentialRequired)
        }
    }
}

/// A required string argument; absent or empty is a missing parameter
fn required_str<'a>(
    args: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ToolError> {
    optional_str(args, key).ok_or(ToolError::MissingParameter(key))
}

/// An optional string argument; empty strings count as absent
fn optional_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// The `per_page` argument with the registry-wide default
fn per_page(args: &Map<String, Value>) -> i64 {
    args.get("per_page").and_then(Value::as_i64).unwrap_or(30)
}

/// A string field out of a response object, with a fallback
fn str_field<'a>(value: &'a Value, key: &str, fallback: &'a str) -> &'a str {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty()).unwrap_or(fallback)
}

/// A numeric field out of a response object, zero when absent
fn num_field(value: &Value, key: &str) -> i64 {
    value.get(key).and_then(Value::as_i64).unwrap_or(0)
}
