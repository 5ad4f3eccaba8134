//! Pull request comments via the GitHub REST API
//!
//! Uses ureq (sync HTTP), no async runtime needed.
//!
//! # Environment Variables
//!
//! - `PR_NUMBER`: pull request to comment on (absent outside pull requests)
//! - `GITHUB_TOKEN`: token with `pull-requests: write`
//! - `GITHUB_REPOSITORY`: `owner/name`, set by GitHub Actions
//! - `GITHUB_API_URL`: API root, defaults to `https://api.github.com`

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const ENV_PR_NUMBER: &str = "PR_NUMBER";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";

const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub rejects comment bodies longer than this (in characters)
pub const MAX_COMMENT_CHARS: usize = 65_536;

const TRUNCATION_NOTE: &str = "\n\n_Report truncated, see the full report in the job artifacts._\n";

#[derive(Error, Debug)]
pub enum GithubError {
    #[error("Missing {0}")]
    MissingEnv(&'static str),

    #[error("Invalid PR_NUMBER '{0}'")]
    InvalidPrNumber(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

pub type GithubResult<T> = Result<T, GithubError>;

/// Where a comment goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub api_url: String,
    pub repository: String,
    pub number: u64,
}

/// What to do about the PR comment, decided from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentPlan {
    /// `PR_NUMBER` not set
    NotPullRequest,
    Post { target: PullRequest, token: String },
}

impl CommentPlan {
    /// Resolve the plan through `lookup` (injectable for tests).
    pub fn from_lookup<F>(lookup: F) -> GithubResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let Some(pr) = non_empty(ENV_PR_NUMBER) else {
            return Ok(CommentPlan::NotPullRequest);
        };
        let token = non_empty(ENV_GITHUB_TOKEN).ok_or(GithubError::MissingEnv(ENV_GITHUB_TOKEN))?;
        let number = pr
            .trim()
            .parse::<u64>()
            .map_err(|_| GithubError::InvalidPrNumber(pr.clone()))?;
        let repository = non_empty(ENV_GITHUB_REPOSITORY)
            .ok_or(GithubError::MissingEnv(ENV_GITHUB_REPOSITORY))?;
        let api_url = non_empty(ENV_GITHUB_API_URL)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(CommentPlan::Post {
            target: PullRequest {
                api_url,
                repository,
                number,
            },
            token,
        })
    }

    pub fn from_env() -> GithubResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[derive(Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct CommentResponse {
    pub id: Option<u64>,
    pub html_url: Option<String>,
}

/// Cut `body` to fit in a single comment, on a char boundary.
pub fn fit_comment(body: &str) -> std::borrow::Cow<'_, str> {
    if body.chars().count() <= MAX_COMMENT_CHARS {
        return body.into();
    }
    let keep = MAX_COMMENT_CHARS - TRUNCATION_NOTE.chars().count();
    let mut out: String = body.chars().take(keep).collect();
    out.push_str(TRUNCATION_NOTE);
    out.into()
}

/// Minimal client for issue comments
pub struct GithubClient {
    token: String,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false)
        .timeout_global(Some(Duration::from_secs(30)))
        .build()
        .new_agent()
}

impl GithubClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            agent: make_agent(),
        }
    }

    /// Post `body` as a comment on the pull request.
    pub fn post_comment(&self, target: &PullRequest, body: &str) -> GithubResult<CommentResponse> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            target.api_url, target.repository, target.number
        );
        let body = fit_comment(body);

        let response = self
            .agent
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", &format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", concat!("flutter-ci/", env!("CARGO_PKG_VERSION")))
            .send_json(CommentRequest { body: &body })
            .map_err(|e| GithubError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let message = response.into_body().read_to_string().unwrap_or_default();
            return Err(GithubError::Api { status, message });
        }

        response
            .into_body()
            .read_json()
            .map_err(|e| GithubError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;

    fn plan(vars: &[(&str, &str)]) -> GithubResult<CommentPlan> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CommentPlan::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn test_not_a_pull_request() {
        assert_eq!(plan(&[("GITHUB_TOKEN", "t")]).unwrap(), CommentPlan::NotPullRequest);
        assert_eq!(plan(&[("PR_NUMBER", " ")]).unwrap(), CommentPlan::NotPullRequest);
    }

    #[test]
    fn test_missing_token() {
        let err = plan(&[("PR_NUMBER", "99")]).unwrap_err();
        assert_eq!(err.to_string(), "Missing GITHUB_TOKEN");
    }

    #[test]
    fn test_invalid_number_and_missing_repo() {
        let err = plan(&[("PR_NUMBER", "abc"), ("GITHUB_TOKEN", "t")]).unwrap_err();
        assert!(matches!(err, GithubError::InvalidPrNumber(_)));

        let err = plan(&[("PR_NUMBER", "42"), ("GITHUB_TOKEN", "t")]).unwrap_err();
        assert_eq!(err.to_string(), "Missing GITHUB_REPOSITORY");
    }

    #[test]
    fn test_post_plan() {
        let plan = plan(&[
            ("PR_NUMBER", "42"),
            ("GITHUB_TOKEN", "fake"),
            ("GITHUB_REPOSITORY", "acme/app"),
            ("GITHUB_API_URL", "https://ghe.example.com/api/v3/"),
        ])
        .unwrap();
        assert_eq!(
            plan,
            CommentPlan::Post {
                target: PullRequest {
                    api_url: "https://ghe.example.com/api/v3".into(),
                    repository: "acme/app".into(),
                    number: 42,
                },
                token: "fake".into(),
            }
        );
    }

    #[test]
    fn test_fit_comment() {
        assert_eq!(fit_comment("short"), "short");
        let long = "é".repeat(MAX_COMMENT_CHARS + 10);
        let fitted = fit_comment(&long);
        assert_eq!(fitted.chars().count(), MAX_COMMENT_CHARS);
        assert!(fitted.ends_with(TRUNCATION_NOTE));
    }

    /// Serve one canned HTTP response and hand back the raw request.
    fn serve_once(status: &'static str, body: &'static str) -> (String, std::thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                head.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut body_buf = vec![0u8; content_length];
            reader.read_exact(&mut body_buf).unwrap();
            head.push_str(&String::from_utf8_lossy(&body_buf));

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            )
            .unwrap();
            head
        });
        (addr, handle)
    }

    #[test]
    fn test_post_comment_success() {
        let (api_url, server) = serve_once(
            "201 Created",
            r#"{"id": 7, "html_url": "https://github.com/acme/app/pull/42#issuecomment-7"}"#,
        );
        let target = PullRequest {
            api_url,
            repository: "acme/app".into(),
            number: 42,
        };

        let resp = GithubClient::new("fake").post_comment(&target, "### Hello").unwrap();
        let request = server.join().unwrap();

        assert_eq!(resp.id, Some(7));
        assert!(request.starts_with("POST /repos/acme/app/issues/42/comments "));
        assert!(request.to_lowercase().contains("authorization: bearer fake"));
        let (_, raw_body) = request.split_once("\r\n\r\n").unwrap();
        let sent: serde_json::Value = serde_json::from_str(raw_body).unwrap();
        assert_eq!(sent["body"], "### Hello");
    }

    #[test]
    fn test_post_comment_api_error() {
        let (api_url, server) = serve_once("403 Forbidden", r#"{"message": "Resource not accessible"}"#);
        let target = PullRequest {
            api_url,
            repository: "acme/app".into(),
            number: 1,
        };

        let err = GithubClient::new("fake").post_comment(&target, "x").unwrap_err();
        server.join().unwrap();

        match err {
            GithubError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("Resource not accessible"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
