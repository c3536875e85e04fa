//! Text command parsing
//!
//! One line of free text becomes a tool name plus a named-argument map.
//! Plain-text commands keep the surface drivable by a human at a prompt
//! or by an upstream agent without a structured call format; quote-aware
//! tokenizing lets titles and bodies carry embedded spaces.
//!
//! Supported commands:
//! - `list_repositories <username>`
//! - `get_repo_details <owner/repo>`
//! - `search_repositories <query> [sort] [order]`
//! - `create_repository <name> [description] [private]`
//! - `fork_repository <owner/repo>`
//! - `list_issues <owner/repo> [state] [labels]`
//! - `create_issue <owner/repo> <title> [body]`
//! - `update_issue <owner/repo> <issue_number> [title] [body] [state]`
//! - `list_pull_requests <owner/repo> [state]`
//! - `create_pull_request <owner/repo> <title> <head> <base> [body]`
//! - `get_file_contents <owner/repo> <path> [branch]`
//! - `create_or_update_file <owner/repo> <path> <content> <message> <branch> [sha]`
//! - `list_branches <owner/repo>`
//! - `create_branch <owner/repo> <branch> [from_branch]`
//! - `list_commits <owner/repo> [branch]`
//! - `search_code <query>`
//! - `list_releases <owner/repo>`
//! - `get_user_info <username>`

use serde_json::{Map, Value};
use thiserror::Error;

/// A parsed command: tool name plus named arguments
///
/// The parser does not validate the name against the tool registry; an
/// unknown name simply fails to parse here, and a name that parses but
/// has no handler is rejected by the dispatcher as a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Name of the tool to invoke
    pub tool_name: String,
    /// Named arguments in dispatch-ready form
    pub arguments: Map<String, Value>,
}

/// Fatal parse failures
///
/// Distinct from the "no command" outcome: a malformed typed argument
/// aborts the call rather than silently degrading.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Invalid issue number: {0}")]
    InvalidIssueNumber(String),
}

/// Parse one command line into a [`Command`]
///
/// Returns `Ok(None)` when the line is empty, the command word is
/// unrecognized, or the line has fewer tokens than the command requires.
/// Tokenizing respects shell-style quoting; if quote parsing fails the
/// line is re-split on plain whitespace.
pub fn parse_command(query: &str) -> Result<Option<Command>, CommandError> {
    let parts = match shell_words::split(query) {
        Ok(parts) => parts,
        Err(_) => query.split_whitespace().map(str::to_string).collect(),
    };

    let Some(cmd) = parts.first() else {
        return Ok(None);
    };
    let cmd = cmd.to_lowercase();

    let mut args = Map::new();

    let tool_name = match cmd.as_str() {
        // Repository tools
        "list_repositories" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("username".to_string(), Value::from(parts[1].clone()));
            "list_repositories"
        }
        "get_repo_details" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            "get_repo_details"
        }
        "search_repositories" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("query".to_string(), Value::from(parts[1].clone()));
            if parts.len() > 2 {
                args.insert("sort".to_string(), Value::from(parts[2].clone()));
            }
            if parts.len() > 3 {
                args.insert("order".to_string(), Value::from(parts[3].clone()));
            }
            "search_repositories"
        }
        "create_repository" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("name".to_string(), Value::from(parts[1].clone()));
            if parts.len() > 2 {
                args.insert("description".to_string(), Value::from(parts[2].clone()));
            }
            if parts.len() > 3 {
                let private = matches!(parts[3].to_lowercase().as_str(), "true" | "1" | "yes");
                args.insert("private".to_string(), Value::from(private));
            }
            "create_repository"
        }
        "fork_repository" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            "fork_repository"
        }

        // Issue tools
        "list_issues" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            if parts.len() > 2 {
                args.insert("state".to_string(), Value::from(parts[2].clone()));
            }
            if parts.len() > 3 {
                args.insert("labels".to_string(), Value::from(parts[3].clone()));
            }
            "list_issues"
        }
        "create_issue" => {
            if parts.len() < 3 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            args.insert("title".to_string(), Value::from(parts[2].clone()));
            if parts.len() > 3 {
                args.insert("body".to_string(), Value::from(parts[3].clone()));
            }
            "create_issue"
        }
        "update_issue" => {
            if parts.len() < 3 {
                return Ok(None);
            }
            let number: i64 = parts[2]
                .parse()
                .map_err(|_| CommandError::InvalidIssueNumber(parts[2].clone()))?;
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            args.insert("issue_number".to_string(), Value::from(number));
            if parts.len() > 3 {
                args.insert("title".to_string(), Value::from(parts[3].clone()));
            }
            if parts.len() > 4 {
                args.insert("body".to_string(), Value::from(parts[4].clone()));
            }
            if parts.len() > 5 {
                args.insert("state".to_string(), Value::from(parts[5].clone()));
            }
            "update_issue"
        }

        // Pull request tools
        "list_pull_requests" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            if parts.len() > 2 {
                args.insert("state".to_string(), Value::from(parts[2].clone()));
            }
            "list_pull_requests"
        }
        "create_pull_request" => {
            if parts.len() < 5 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            args.insert("title".to_string(), Value::from(parts[2].clone()));
            args.insert("head".to_string(), Value::from(parts[3].clone()));
            args.insert("base".to_string(), Value::from(parts[4].clone()));
            if parts.len() > 5 {
                args.insert("body".to_string(), Value::from(parts[5].clone()));
            }
            "create_pull_request"
        }

        // File tools
        "get_file_contents" => {
            if parts.len() < 3 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            args.insert("path".to_string(), Value::from(parts[2].clone()));
            if parts.len() > 3 {
                args.insert("branch".to_string(), Value::from(parts[3].clone()));
            }
            "get_file_contents"
        }
        "create_or_update_file" => {
            if parts.len() < 6 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            args.insert("path".to_string(), Value::from(parts[2].clone()));
            args.insert("content".to_string(), Value::from(parts[3].clone()));
            args.insert("message".to_string(), Value::from(parts[4].clone()));
            args.insert("branch".to_string(), Value::from(parts[5].clone()));
            if parts.len() > 6 {
                args.insert("sha".to_string(), Value::from(parts[6].clone()));
            }
            "create_or_update_file"
        }

        // Branch tools
        "list_branches" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            "list_branches"
        }
        "create_branch" => {
            if parts.len() < 3 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            args.insert("branch".to_string(), Value::from(parts[2].clone()));
            if parts.len() > 3 {
                args.insert("from_branch".to_string(), Value::from(parts[3].clone()));
            }
            "create_branch"
        }

        // Commit tools
        "list_commits" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            if parts.len() > 2 {
                args.insert("branch".to_string(), Value::from(parts[2].clone()));
            }
            "list_commits"
        }

        // Search tools
        "search_code" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("query".to_string(), Value::from(parts[1].clone()));
            "search_code"
        }

        // Release tools
        "list_releases" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("repo".to_string(), Value::from(parts[1].clone()));
            "list_releases"
        }

        // User tools
        "get_user_info" => {
            if parts.len() < 2 {
                return Ok(None);
            }
            args.insert("username".to_string(), Value::from(parts[1].clone()));
            "get_user_info"
        }

        _ => return Ok(None),
    };

    Ok(Some(Command {
        tool_name: tool_name.to_string(),
        arguments: args,
    }))
}

/// Command usage lines for help output
pub const COMMAND_HELP: &[&str] = &[
    "list_repositories <username>",
    "get_repo_details <owner/repo>",
    "search_repositories <query> [sort] [order]",
    "create_repository <name> [description] [private]",
    "fork_repository <owner/repo>",
    "list_issues <owner/repo> [state] [labels]",
    "create_issue <owner/repo> <title> [body]",
    "update_issue <owner/repo> <issue_number> [title] [body] [state]",
    "list_pull_requests <owner/repo> [state]",
    "create_pull_request <owner/repo> <title> <head> <base> [body]",
    "get_file_contents <owner/repo> <path> [branch]",
    "create_or_update_file <owner/repo> <path> <content> <message> <branch> [sha]",
    "list_branches <owner/repo>",
    "create_branch <owner/repo> <branch> [from_branch]",
    "list_commits <owner/repo> [branch]",
    "search_code <query>",
    "list_releases <owner/repo>",
    "get_user_info <username>",
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(query: &str) -> Option<Command> {
        parse_command(query).unwrap()
    }

    #[test]
    fn empty_input_is_no_command() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn unknown_word_is_no_command() {
        assert_eq!(parse("frobnicate octocat"), None);
    }

    #[test]
    fn command_word_is_case_insensitive() {
        let cmd = parse("LIST_REPOSITORIES octocat").unwrap();
        assert_eq!(cmd.tool_name, "list_repositories");
        assert_eq!(cmd.arguments["username"], json!("octocat"));
    }

    #[test]
    fn too_few_tokens_is_no_command_not_partial() {
        assert_eq!(parse("list_repositories"), None);
        assert_eq!(parse("create_issue octocat/hello"), None);
        assert_eq!(parse("create_pull_request o/r title head"), None);
        assert_eq!(parse("create_or_update_file o/r path content msg"), None);
    }

    #[test]
    fn quoted_arguments_keep_embedded_spaces() {
        let cmd = parse(r#"create_issue octocat/hello "Broken build" "CI fails on main""#)
            .unwrap();
        assert_eq!(cmd.tool_name, "create_issue");
        assert_eq!(cmd.arguments["title"], json!("Broken build"));
        assert_eq!(cmd.arguments["body"], json!("CI fails on main"));
    }

    #[test]
    fn unbalanced_quote_falls_back_to_whitespace_split() {
        let cmd = parse(r#"create_issue octocat/hello "Broken"#).unwrap();
        assert_eq!(cmd.tool_name, "create_issue");
        assert_eq!(cmd.arguments["title"], json!("\"Broken"));
    }

    #[test]
    fn trailing_optionals_are_positional() {
        let cmd = parse("list_issues octocat/hello closed bug,regression").unwrap();
        assert_eq!(cmd.arguments["state"], json!("closed"));
        assert_eq!(cmd.arguments["labels"], json!("bug,regression"));

        let cmd = parse("list_issues octocat/hello").unwrap();
        assert!(!cmd.arguments.contains_key("state"));
        assert!(!cmd.arguments.contains_key("labels"));
    }

    #[test]
    fn issue_number_is_converted_to_integer() {
        let cmd = parse("update_issue octocat/hello 42 \"New title\"").unwrap();
        assert_eq!(cmd.arguments["issue_number"], json!(42));
    }

    #[test]
    fn bad_issue_number_is_a_fatal_error() {
        let result = parse_command("update_issue octocat/hello forty-two");
        assert_eq!(
            result,
            Err(CommandError::InvalidIssueNumber("forty-two".to_string()))
        );
    }

    #[test]
    fn create_repository_private_flag_parses_booleans() {
        for raw in ["true", "1", "YES"] {
            let cmd = parse(&format!("create_repository demo \"A demo\" {}", raw)).unwrap();
            assert_eq!(cmd.arguments["private"], json!(true), "raw: {}", raw);
        }
        let cmd = parse("create_repository demo \"A demo\" nope").unwrap();
        assert_eq!(cmd.arguments["private"], json!(false));
    }

    #[test]
    fn full_file_write_command_parses() {
        let cmd = parse(
            r#"create_or_update_file o/r docs/a.md "hello world" "add docs" main abc123"#,
        )
        .unwrap();
        assert_eq!(cmd.tool_name, "create_or_update_file");
        assert_eq!(cmd.arguments["content"], json!("hello world"));
        assert_eq!(cmd.arguments["message"], json!("add docs"));
        assert_eq!(cmd.arguments["branch"], json!("main"));
        assert_eq!(cmd.arguments["sha"], json!("abc123"));
    }
}
