//! Blocking GitHub REST client
//!
//! Just the handful of endpoints the queue workflow needs: finding the bot's
//! status comment on a PR thread, creating tracker issues, and posting or
//! updating comments. Base URL comes from `GITHUB_API_URL` (set on Actions
//! runners), defaulting to the public API.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use ureq::Agent;

const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("issueq/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: usize = 100;

/// A failed API call, with the HTTP status when the server answered
#[derive(Debug)]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub message: String,
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "status={},msg={}", status, self.message),
            None => write!(f, "transport error: {}", self.message),
        }
    }
}

impl From<ureq::Error> for ApiFailure {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                // GitHub error bodies carry a "message" field
                let message = response
                    .into_json::<serde_json::Value>()
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                    .unwrap_or_else(|| format!("HTTP {}", status));
                Self {
                    status: Some(status),
                    message,
                }
            }
            ureq::Error::Transport(transport) => Self {
                status: None,
                message: transport.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommentUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Comment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<CommentUser>,
    html_url: String,
}

/// The bot's status comment on a PR thread
#[derive(Debug, Clone)]
pub struct BotComment {
    pub id: u64,
    pub body: String,
    pub html_url: String,
}

/// A freshly created tracker issue
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct CreatedIssue {
    pub number: u64,
    pub html_url: String,
}

pub struct GithubClient {
    agent: Agent,
    base: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Self {
        let base = std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::with_base(base, token)
    }

    /// Client against an explicit API base URL
    pub fn with_base(base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            agent: ureq::agent(),
            base: base.into(),
            token,
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let mut req = self
            .agent
            .request(method, &format!("{}{}", self.base, path))
            .set("Accept", "application/vnd.github+json")
            .set("User-Agent", USER_AGENT);
        if let Some(ref token) = self.token {
            req = req.set("Authorization", &format!("Bearer {}", token));
        }
        req
    }

    /// List every comment on an issue/PR thread, following pagination
    fn list_comments(&self, owner: &str, repo: &str, issue_number: u64) -> Result<Vec<Comment>> {
        let mut comments = Vec::new();
        let mut page = 1;

        loop {
            let path = format!(
                "/repos/{}/{}/issues/{}/comments?per_page={}&page={}",
                owner, repo, issue_number, PER_PAGE, page
            );
            let batch: Vec<Comment> = self
                .request("GET", &path)
                .call()
                .map_err(|e| anyhow!("listing comments: {}", ApiFailure::from(e)))?
                .into_json()
                .context("decoding comment list")?;

            let len = batch.len();
            comments.extend(batch);
            if len < PER_PAGE {
                return Ok(comments);
            }
            page += 1;
        }
    }

    /// Find the first comment on the thread authored by the bot account
    pub fn find_first_bot_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        bot_username: &str,
    ) -> Result<Option<BotComment>> {
        let comment = self
            .list_comments(owner, repo, issue_number)?
            .into_iter()
            .find(|c| c.user.as_ref().is_some_and(|u| u.login == bot_username));

        Ok(comment.map(|c| BotComment {
            id: c.id,
            body: c.body.unwrap_or_default(),
            html_url: c.html_url,
        }))
    }

    /// Create a tracker issue in `repo` ("owner/name")
    pub fn create_issue(
        &self,
        repo: &str,
        title: &str,
        labels: &[String],
        body: &str,
    ) -> std::result::Result<CreatedIssue, ApiFailure> {
        let (owner, name) = repo.split_once('/').ok_or_else(|| ApiFailure {
            status: None,
            message: format!("invalid repository '{}'", repo),
        })?;

        self.request("POST", &format!("/repos/{}/{}/issues", owner, name))
            .send_json(serde_json::json!({
                "title": title,
                "labels": labels,
                "body": body,
            }))?
            .into_json()
            .map_err(|e| ApiFailure {
                status: None,
                message: format!("decoding created issue: {}", e),
            })
    }

    /// Post a new comment on an issue/PR thread
    pub fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<()> {
        self.request(
            "POST",
            &format!("/repos/{}/{}/issues/{}/comments", owner, repo, issue_number),
        )
        .send_json(serde_json::json!({ "body": body }))
        .map_err(|e| anyhow!("posting comment: {}", ApiFailure::from(e)))?;
        Ok(())
    }

    /// Edit an existing issue/PR comment
    pub fn update_comment(&self, owner: &str, repo: &str, comment_id: u64, body: &str) -> Result<()> {
        self.request(
            "PATCH",
            &format!("/repos/{}/{}/issues/comments/{}", owner, repo, comment_id),
        )
        .send_json(serde_json::json!({ "body": body }))
        .map_err(|e| anyhow!("updating comment: {}", ApiFailure::from(e)))?;
        Ok(())
    }

    /// Reply in-thread to a pull request review comment
    pub fn create_review_reply(
        &self,
        owner: &str,
        repo: &str,
        pull_number: u64,
        comment_id: u64,
        body: &str,
    ) -> Result<()> {
        self.request(
            "POST",
            &format!(
                "/repos/{}/{}/pulls/{}/comments/{}/replies",
                owner, repo, pull_number, comment_id
            ),
        )
        .send_json(serde_json::json!({ "body": body }))
        .map_err(|e| anyhow!("replying to review comment: {}", ApiFailure::from(e)))?;
        Ok(())
    }
}
