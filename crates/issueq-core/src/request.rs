//! Data model for queued issue requests
//!
//! A reviewer queues `IssueRequest`s against a pull request; each one becomes
//! a `LedgerEntry` (request + content-derived uid) inside the persistent
//! status comment. `Operation` is the tagged batch format the reconciler
//! consumes.

use serde::{Deserialize, Serialize};

/// A request to create an issue on some tracker repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRequest {
    /// Target repository, "owner/name"
    pub repo: String,

    /// Issue title
    pub title: String,

    /// Labels to apply, order significant, duplicates allowed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Tracker issue number, present once the issue exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<u64>,
}

impl IssueRequest {
    /// Create a pending request with no labels
    pub fn new(repo: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            title: title.into(),
            labels: Vec::new(),
            num: None,
        }
    }

    /// Whether the referenced tracker issue already exists
    pub fn is_created(&self) -> bool {
        self.num.is_some()
    }
}

/// One row of the ledger: a request keyed by its content-derived uid
///
/// The uid is a truncated hash and is not guaranteed unique; two entries with
/// identical (repo, title, labels) share a uid and are both kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// 6-hex-char content hash, see [`crate::uid::entry_uid`]
    pub uid: String,

    #[serde(flatten)]
    pub request: IssueRequest,
}

/// One requested change to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Queue a new issue request
    Addition { issue: IssueRequest },
    /// Unqueue a pending entry by uid
    Removal { uid: String },
    /// Mark an entry as created with its tracker issue number
    Creation { uid: String, num: u64 },
}

/// A `{owner}/{repo}#{number}` reference to an issue or pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    pub num: u64,
}

impl IssueRef {
    /// The "owner/repo" part of the reference
    pub fn full_repo(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl std::str::FromStr for IssueRef {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || crate::Error::InvalidReference(s.to_string());

        let (repo_part, num_part) = s.rsplit_once('#').ok_or_else(invalid)?;
        let (owner, repo) = repo_part.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return Err(invalid());
        }
        if num_part.is_empty() || !num_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let num = num_part.parse().map_err(|_| invalid())?;

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            num,
        })
    }
}

impl std::fmt::Display for IssueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.num)
    }
}
