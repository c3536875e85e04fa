//! Dispatch tests: parsed commands through the registry against a mock
//! GitHub endpoint

use httpmock::prelude::*;
use httpmock::Method::PATCH;
use octomcp::command::parse_command;
use octomcp::github::{GitHubApi, GitHubTools};
use octomcp::schema::server::CallToolResult;
use regex::Regex;
use serde_json::json;

fn anonymous(server: &MockServer) -> GitHubTools {
    GitHubTools::new(GitHubApi::new(None).with_base_url(server.base_url()))
}

fn authenticated(server: &MockServer) -> GitHubTools {
    GitHubTools::new(GitHubApi::new(Some("test-token".to_string())).with_base_url(server.base_url()))
}

async fn dispatch(tools: &GitHubTools, query: &str) -> CallToolResult {
    let command = parse_command(query)
        .expect("command should parse")
        .expect("command should be recognized");
    tools.dispatch(&command.tool_name, &command.arguments).await
}

#[tokio::test]
async fn two_repositories_become_two_blocks() {
    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method(GET)
            .path("/users/octocat/repos")
            .query_param("per_page", "100");
        then.status(200).json_body(json!([
            {
                "full_name": "octocat/hello",
                "visibility": "public",
                "stargazers_count": 3,
                "description": "First demo"
            },
            {
                "full_name": "octocat/world",
                "visibility": "public",
                "stargazers_count": 1,
                "description": null
            }
        ]));
    });

    let result = dispatch(&anonymous(&server), "list_repositories octocat").await;
    listing.assert();

    assert!(!result.failed());
    let texts = result.texts();
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("octocat/hello"));
    assert!(texts[0].contains("⭐ 3"));
    assert!(texts[1].contains("octocat/world"));
    assert!(texts[1].contains("No description"));
}

#[tokio::test]
async fn empty_listing_is_an_explicit_nothing_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users/octocat/repos");
        then.status(200).json_body(json!([]));
    });

    let result = dispatch(&anonymous(&server), "list_repositories octocat").await;

    assert!(!result.failed());
    assert_eq!(result.texts(), vec!["No repositories found".to_string()]);
}

#[tokio::test]
async fn remote_error_message_is_surfaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users/ghost/repos");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });

    let result = dispatch(&anonymous(&server), "list_repositories ghost").await;

    assert!(result.failed());
    assert_eq!(result.texts(), vec!["Not Found".to_string()]);
}

#[tokio::test]
async fn slashless_repo_reference_is_rejected_before_any_call() {
    let server = MockServer::start();
    let any_request = server.mock(|when, then| {
        when.path_matches(Regex::new(".*").unwrap());
        then.status(200).json_body(json!({}));
    });

    let result = dispatch(&anonymous(&server), "get_repo_details octocat").await;

    assert!(result.failed());
    assert_eq!(
        result.texts(),
        vec!["Invalid repo format. Use 'owner/repo'".to_string()]
    );
    any_request.assert_hits(0);
}

#[tokio::test]
async fn issue_listing_filters_out_pull_requests() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/octocat/hello/issues")
            .query_param("state", "open");
        then.status(200).json_body(json!([
            {
                "number": 7,
                "title": "Real issue",
                "state": "open",
                "labels": [{"name": "bug"}],
                "html_url": "https://github.com/octocat/hello/issues/7"
            },
            {
                "number": 8,
                "title": "Actually a PR",
                "state": "open",
                "labels": [],
                "html_url": "https://github.com/octocat/hello/pull/8",
                "pull_request": {"url": "https://api.github.com/repos/octocat/hello/pulls/8"}
            }
        ]));
    });

    let result = dispatch(&anonymous(&server), "list_issues octocat/hello").await;

    let texts = result.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("#7 - Real issue"));
    assert!(texts[0].contains("Labels: bug"));
}

#[tokio::test]
async fn all_pull_requests_still_means_no_issues_found() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/octocat/hello/issues");
        then.status(200).json_body(json!([
            {"number": 8, "title": "A PR", "state": "open", "pull_request": {}}
        ]));
    });

    let result = dispatch(&anonymous(&server), "list_issues octocat/hello").await;

    assert!(!result.failed());
    assert_eq!(result.texts(), vec!["No issues found".to_string()]);
}

#[tokio::test]
async fn mutating_tools_fail_closed_without_a_token() {
    let server = MockServer::start();
    let any_request = server.mock(|when, then| {
        when.path_matches(Regex::new(".*").unwrap());
        then.status(200).json_body(json!({}));
    });

    let tools = anonymous(&server);
    let mutating = [
        "create_repository demo",
        "fork_repository octocat/hello",
        "create_issue octocat/hello Title",
        "update_issue octocat/hello 3 Title",
        "create_pull_request octocat/hello Title feature main",
        "create_or_update_file octocat/hello a.md content msg main",
        "create_branch octocat/hello feature",
    ];

    for query in mutating {
        let result = dispatch(&tools, query).await;
        assert!(result.failed(), "{} should fail without a token", query);
        assert_eq!(
            result.texts(),
            vec!["GitHub token required for this operation".to_string()],
            "{} should return the fixed credential error",
            query
        );
    }

    any_request.assert_hits(0);
}

#[tokio::test]
async fn branch_creation_issues_two_ordered_calls() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET).path("/repos/octocat/hello/git/ref/heads/main");
        then.status(200).json_body(json!({
            "object": {"sha": "abc1234def5678"}
        }));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/octocat/hello/git/refs")
            .json_body(json!({
                "ref": "refs/heads/feature",
                "sha": "abc1234def5678"
            }));
        then.status(201).json_body(json!({"ref": "refs/heads/feature"}));
    });

    let result = dispatch(&authenticated(&server), "create_branch octocat/hello feature").await;

    lookup.assert();
    create.assert();
    assert!(!result.failed());
    assert_eq!(
        result.texts(),
        vec!["Branch 'feature' created from 'main'".to_string()]
    );
}

#[tokio::test]
async fn failed_ref_lookup_skips_branch_creation() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/octocat/hello/git/ref/heads/gone");
        then.status(404).json_body(json!({"message": "Not Found"}));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path("/repos/octocat/hello/git/refs");
        then.status(201).json_body(json!({}));
    });

    let result =
        dispatch(&authenticated(&server), "create_branch octocat/hello feature gone").await;

    assert!(result.failed());
    assert_eq!(result.texts(), vec!["Not Found".to_string()]);
    create.assert_hits(0);
}

#[tokio::test]
async fn file_write_uploads_base64_content() {
    let server = MockServer::start();
    // "hello world" in base64.
    let upload = server.mock(|when, then| {
        when.method(PUT)
            .path("/repos/octocat/hello/contents/docs/a.md")
            .json_body_partial(r#"{"content": "aGVsbG8gd29ybGQ=", "branch": "main"}"#);
        then.status(201).json_body(json!({
            "content": {"html_url": "https://github.com/octocat/hello/blob/main/docs/a.md"}
        }));
    });

    let result = dispatch(
        &authenticated(&server),
        r#"create_or_update_file octocat/hello docs/a.md "hello world" "add docs" main"#,
    )
    .await;

    upload.assert();
    assert!(!result.failed());
    assert_eq!(
        result.texts(),
        vec!["File created: https://github.com/octocat/hello/blob/main/docs/a.md".to_string()]
    );
}

#[tokio::test]
async fn file_write_with_sha_reports_an_update() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(PUT)
            .path("/repos/octocat/hello/contents/docs/a.md")
            .json_body_partial(r#"{"sha": "oldsha123"}"#);
        then.status(200).json_body(json!({
            "content": {"html_url": "https://github.com/octocat/hello/blob/main/docs/a.md"}
        }));
    });

    let result = dispatch(
        &authenticated(&server),
        r#"create_or_update_file octocat/hello docs/a.md "hello world" "update docs" main oldsha123"#,
    )
    .await;

    assert!(!result.failed());
    assert!(result.texts()[0].starts_with("File updated:"));
}

#[tokio::test]
async fn file_read_decodes_base64_content() {
    let server = MockServer::start();
    // The contents endpoint wraps base64 across lines; the decoder must
    // cope with the embedded newline.
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/octocat/hello/contents/docs/a.md")
            .query_param("ref", "main");
        then.status(200).json_body(json!({
            "content": "aGVsbG8g\nd29ybGQ=",
            "size": 11,
            "sha": "abc123"
        }));
    });

    let result = dispatch(
        &anonymous(&server),
        "get_file_contents octocat/hello docs/a.md main",
    )
    .await;

    assert!(!result.failed());
    let texts = result.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("File: docs/a.md"));
    assert!(texts[0].contains("Size: 11 bytes"));
    assert!(texts[0].ends_with("hello world"));
}

#[tokio::test]
async fn search_results_carry_a_header_segment() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/search/repositories")
            .query_param("q", "rust http")
            .query_param("sort", "stars");
        then.status(200).json_body(json!({
            "total_count": 920,
            "items": [
                {"full_name": "a/one", "stargazers_count": 50, "description": "x"},
                {"full_name": "b/two", "stargazers_count": 40, "description": "y"}
            ]
        }));
    });

    let result = dispatch(&anonymous(&server), r#"search_repositories "rust http" stars"#).await;

    let texts = result.texts();
    assert_eq!(texts.len(), 3);
    assert_eq!(texts[0], "Found 920 repositories (showing 2):");
    assert!(texts[1].contains("a/one"));
    assert!(texts[2].contains("b/two"));
}

#[tokio::test]
async fn update_issue_patches_only_the_given_fields() {
    let server = MockServer::start();
    let patch = server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/octocat/hello/issues/42")
            .json_body(json!({"title": "New title"}));
        then.status(200).json_body(json!({
            "number": 42,
            "html_url": "https://github.com/octocat/hello/issues/42"
        }));
    });

    let result = dispatch(
        &authenticated(&server),
        r#"update_issue octocat/hello 42 "New title""#,
    )
    .await;

    patch.assert();
    assert!(!result.failed());
    assert_eq!(
        result.texts(),
        vec!["Issue updated: #42 - https://github.com/octocat/hello/issues/42".to_string()]
    );
}

#[tokio::test]
async fn user_summary_is_a_single_block() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users/octocat");
        then.status(200).json_body(json!({
            "login": "octocat",
            "name": "The Octocat",
            "public_repos": 8,
            "followers": 4000,
            "following": 9,
            "created_at": "2011-01-25T18:44:36Z",
            "html_url": "https://github.com/octocat"
        }));
    });

    let result = dispatch(&anonymous(&server), "get_user_info octocat").await;

    let texts = result.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("Username: octocat"));
    assert!(texts[0].contains("Public Repos: 8"));
    assert!(texts[0].contains("Bio: N/A"));
}
