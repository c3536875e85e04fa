//! Remote call executor for the GitHub REST API
//!
//! One outbound HTTP call per invocation, a fixed header set, and a
//! two-way outcome classification: network-level failures (connect, DNS,
//! TLS) versus remote-reported application errors carrying a `message`
//! body. No retries and no timeout policy beyond the client's own
//! defaults.

use log::debug;
use serde_json::Value;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const ACCEPT_HEADER: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("octomcp/", env!("CARGO_PKG_VERSION"));

/// Outcomes of a failed remote call
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// The call never completed: connectivity, DNS or TLS failure
    #[error("Failed to connect to GitHub API: {0}")]
    Connect(String),

    /// The call completed but GitHub reported a non-accepted status;
    /// carries the remote `message` when present, else the status code
    #[error("{0}")]
    Remote(String),
}

/// HTTP client for the GitHub REST API
///
/// The token is read once at construction and never mutated; its absence
/// means unauthenticated, read-only access to public data.
#[derive(Debug, Clone)]
pub struct GitHubApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubApi {
    /// Create a client with an optional bearer token
    pub fn new(token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Create a client taking the token from `GITHUB_TOKEN`
    pub fn from_env() -> Self {
        Self::new(std::env::var("GITHUB_TOKEN").ok())
    }

    /// Point the client at a different API root (tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Whether a token is configured
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http.request(method, url).header("Accept", ACCEPT_HEADER);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("token {}", token));
        }
        builder
    }

    async fn execute(
        &self,
        builder: reqwest::RequestBuilder,
        accepted: &[u16],
    ) -> Result<Value, ApiError> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Connect(e.to_string()))?;

        let status = response.status().as_u16();
        debug!("GitHub API responded with status {}", status);

        // Error bodies are JSON with a `message` field; anything that
        // fails to decode degrades to the bare status code.
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if accepted.contains(&status) {
            Ok(body)
        } else {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| status.to_string());
            Err(ApiError::Remote(message))
        }
    }

    /// GET with query parameters; 200 is the only accepted status
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.execute(self.request(reqwest::Method::GET, path).query(query), &[200])
            .await
    }

    /// POST a JSON body
    pub async fn post(
        &self,
        path: &str,
        body: &Value,
        accepted: &[u16],
    ) -> Result<Value, ApiError> {
        self.execute(self.request(reqwest::Method::POST, path).json(body), accepted)
            .await
    }

    /// PATCH a JSON body; 200 is the only accepted status
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.execute(self.request(reqwest::Method::PATCH, path).json(body), &[200])
            .await
    }

    /// PUT a JSON body
    pub async fn put(
        &self,
        path: &str,
        body: &Value,
        accepted: &[u16],
    ) -> Result<Value, ApiError> {
        self.execute(self.request(reqwest::Method::PUT, path).json(body), accepted)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn remote_message_wins_over_status_code() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/nobody/repos");
            then.status(404).json_body(serde_json::json!({"message": "Not Found"}));
        });

        let api = GitHubApi::new(None).with_base_url(server.base_url());
        let err = api.get("/users/nobody/repos", &[]).await.unwrap_err();

        match err {
            ApiError::Remote(message) => assert_eq!(message, "Not Found"),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_json_error_body_degrades_to_status_code() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/users/octocat");
            then.status(500).body("boom");
        });

        let api = GitHubApi::new(None).with_base_url(server.base_url());
        let err = api.get("/users/octocat", &[]).await.unwrap_err();

        match err {
            ApiError::Remote(message) => assert_eq!(message, "500"),
            other => panic!("expected remote error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_connect_error() {
        // Port 1 on localhost refuses connections.
        let api = GitHubApi::new(None).with_base_url("http://127.0.0.1:1");
        let err = api.get("/users/octocat", &[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Connect(_)));
    }

    #[tokio::test]
    async fn token_is_attached_only_when_configured() {
        let server = MockServer::start();
        let with_auth = server.mock(|when, then| {
            when.method(GET)
                .path("/user/repos")
                .header("Authorization", "token sekret");
            then.status(200).json_body(serde_json::json!([]));
        });

        let api = GitHubApi::new(Some("sekret".to_string())).with_base_url(server.base_url());
        api.get("/user/repos", &[]).await.unwrap();
        with_auth.assert();

        let anonymous = GitHubApi::new(None);
        assert!(!anonymous.has_token());

        let blank = GitHubApi::new(Some(String::new()));
        assert!(!blank.has_token());
    }
}
