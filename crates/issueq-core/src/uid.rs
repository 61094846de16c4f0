//! Content-derived uid generation for ledger entries
//!
//! Entries are addressed by the first 24 bits of a SHA-1 digest over
//! (repo, title, labels), rendered as 6 lowercase hex chars. `num` never
//! participates, so marking an entry created does not change its uid.
//!
//! This is an identifier, not a security primitive: the fields are hashed
//! without separators (so ("ab", "c") and ("a", "bc") collide) and 24 bits
//! leaves real collision odds on large ledgers. Collisions are accepted;
//! the ledger never deduplicates on uid.

use crate::IssueRequest;
use sha1::{Digest, Sha1};

/// Compute the 6-hex-char uid for an issue request
pub fn entry_uid(issue: &IssueRequest) -> String {
    let mut hasher = Sha1::new();
    hasher.update(issue.repo.as_bytes());
    hasher.update(issue.title.as_bytes());
    for label in &issue.labels {
        hasher.update(label.as_bytes());
    }

    let digest = hasher.finalize();
    format!("{:02x}{:02x}{:02x}", digest[0], digest[1], digest[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(repo: &str, title: &str, labels: &[&str]) -> IssueRequest {
        IssueRequest {
            repo: repo.to_string(),
            title: title.to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            num: None,
        }
    }

    #[test]
    fn known_uids() {
        // Legacy vectors - existing ledgers reference these exact uids
        assert_eq!(entry_uid(&request("org/repo1", "Issue 1", &[])), "14b156");
        assert_eq!(
            entry_uid(&request("org/repo2", "Issue 2", &["label-1"])),
            "d1dc9d"
        );
        assert_eq!(
            entry_uid(&request("org/repo3", "Issue 3", &["label-1", "label 2"])),
            "cf07a9"
        );
    }

    #[test]
    fn deterministic() {
        let a = request("org/repo", "title", &["x", "y"]);
        let b = request("org/repo", "title", &["x", "y"]);
        assert_eq!(entry_uid(&a), entry_uid(&b));
    }

    #[test]
    fn label_order_matters() {
        let ab = request("org/repo", "t", &["a", "b"]);
        let ba = request("org/repo", "t", &["b", "a"]);
        assert_ne!(entry_uid(&ab), entry_uid(&ba));
    }

    #[test]
    fn num_is_ignored() {
        let mut issue = request("org/repo", "t", &["a"]);
        let pending = entry_uid(&issue);
        issue.num = Some(42);
        assert_eq!(entry_uid(&issue), pending);
    }

    #[test]
    fn unseparated_fields_collide() {
        // Known quirk of the hash input layout, kept for uid stability
        let a = request("org/repo", "ti", &["tle"]);
        let b = request("org/repo", "titl", &["e"]);
        assert_eq!(entry_uid(&a), entry_uid(&b));
    }
}
