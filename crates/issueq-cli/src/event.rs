//! GitHub Actions event payload handling
//!
//! Only the slice of the webhook payload the action flow reads. Supported
//! triggers: issue_comment.created, pull_request_review_comment.created and
//! pull_request_target.opened/reopened.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub comment: Option<EventComment>,
    #[serde(default)]
    pub issue: Option<EventThread>,
    #[serde(default)]
    pub pull_request: Option<EventThread>,
    #[serde(default)]
    pub sender: Option<EventUser>,
    #[serde(default)]
    pub repository: Option<EventRepository>,
}

#[derive(Debug, Deserialize)]
pub struct EventComment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct EventThread {
    pub number: u64,
}

#[derive(Debug, Deserialize)]
pub struct EventUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct EventRepository {
    pub full_name: String,
}

impl EventPayload {
    /// Read the payload from `$GITHUB_EVENT_PATH`
    pub fn load() -> Result<Self> {
        let path = std::env::var("GITHUB_EVENT_PATH")
            .context("GITHUB_EVENT_PATH is not set - not running inside GitHub Actions?")?;
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading event payload from {}", path))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("decoding event payload")
    }

    /// Number of the issue or pull request the event fired on
    pub fn thread_number(&self) -> Result<u64> {
        match self.issue.as_ref().or(self.pull_request.as_ref()) {
            Some(thread) => Ok(thread.number),
            None => bail!("event payload has neither an issue nor a pull request"),
        }
    }

    /// The `{owner}/{repo}` the event fired in, from the payload or the
    /// `GITHUB_REPOSITORY` env fallback
    pub fn repo(&self) -> Result<(String, String)> {
        let full_name = match self.repository.as_ref() {
            Some(repository) => repository.full_name.clone(),
            None => std::env::var("GITHUB_REPOSITORY")
                .context("event payload has no repository and GITHUB_REPOSITORY is not set")?,
        };
        match full_name.split_once('/') {
            Some((owner, name)) => Ok((owner.to_string(), name.to_string())),
            None => bail!("malformed repository name '{}'", full_name),
        }
    }

    pub fn sender_login(&self) -> Option<&str> {
        self.sender.as_ref().map(|u| u.login.as_str())
    }
}
