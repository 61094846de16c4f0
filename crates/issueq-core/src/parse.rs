//! Slash-command parsing for review comments
//!
//! Reviewers drive the queue with two line-oriented commands embedded
//! anywhere in free-form comment text:
//!
//! ```text
//! /queue-issue <owner>/<repo>[#<number>] "<title>" [label-a][label-b]...
//! /unqueue-issue <uid>
//! ```
//!
//! Lines that match neither command are ignored; there is no such thing as a
//! parse diagnostic here. The output groups all additions (in source order)
//! before all removals (in source order) - a two-pass scan that does NOT
//! preserve interleaving between the two command kinds. Legacy behavior,
//! kept for compatibility with existing workflows.

use crate::request::{IssueRef, IssueRequest, Operation};
use regex::Regex;
use std::sync::OnceLock;

static QUEUE_REGEX: OnceLock<Regex> = OnceLock::new();
static UNQUEUE_REGEX: OnceLock<Regex> = OnceLock::new();
static ISSUE_LINE_REGEX: OnceLock<Regex> = OnceLock::new();
static LABEL_REGEX: OnceLock<Regex> = OnceLock::new();

fn queue_regex() -> &'static Regex {
    QUEUE_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^/queue-issue\s+(.*)$").expect("queue regex should compile")
    })
}

fn unqueue_regex() -> &'static Regex {
    UNQUEUE_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^/unqueue-issue\s+(\w+)").expect("unqueue regex should compile")
    })
}

/// Shared pattern for a queued-issue line: ref token, quoted title, tail.
/// The title takes double or single quotes; the opposite quote character is
/// allowed unescaped inside.
fn issue_line_regex() -> &'static Regex {
    ISSUE_LINE_REGEX.get_or_init(|| {
        Regex::new(r#"(\S+)\s+("([^"]+)"|'([^']+)')(.*)"#).expect("issue regex should compile")
    })
}

fn label_regex() -> &'static Regex {
    LABEL_REGEX.get_or_init(|| Regex::new(r"\[([^\]]+)\]").expect("label regex should compile"))
}

/// Extract all operations found anywhere in comment text
///
/// Additions come first (in order of appearance), then removals (in order of
/// appearance), regardless of how the commands were interleaved in the text.
pub fn parse_operations(contents: &str) -> Vec<Operation> {
    let mut operations = Vec::new();

    for capture in queue_regex().captures_iter(contents) {
        if let Some(issue) = parse_issue(&capture[1]) {
            operations.push(Operation::Addition { issue });
        }
    }

    for capture in unqueue_regex().captures_iter(contents) {
        operations.push(Operation::Removal {
            uid: capture[1].to_string(),
        });
    }

    operations
}

/// Parse one queued-issue description: `<ref> "<title>" [labels]...`
///
/// Returns `None` when the text has no ref-plus-quoted-title shape at all.
/// A ref of the form `owner/repo#n` sets `num` (queueing a reference to an
/// already-existing issue); any other token is taken verbatim as the repo.
pub fn parse_issue(text: &str) -> Option<IssueRequest> {
    let capture = issue_line_regex().captures(text)?;

    let token = &capture[1];
    let (repo, num) = match token.parse::<IssueRef>() {
        Ok(issue_ref) => (issue_ref.full_repo(), Some(issue_ref.num)),
        Err(_) => (token.to_string(), None),
    };

    let title = capture
        .get(3)
        .or_else(|| capture.get(4))
        .map(|m| m.as_str().to_string())?;

    Some(IssueRequest {
        repo,
        title,
        labels: extract_labels(&capture[5]),
        num,
    })
}

/// Collect `[label]` groups from text, in order of appearance
pub fn extract_labels(contents: &str) -> Vec<String> {
    label_regex()
        .captures_iter(contents)
        .map(|capture| capture[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_issue_with_title_only() {
        let operations = parse_operations(r#"/queue-issue org/repo "my title""#);
        assert_eq!(
            operations,
            vec![Operation::Addition {
                issue: IssueRequest::new("org/repo", "my title"),
            }]
        );
    }

    #[test]
    fn queue_issue_with_quotes_in_title() {
        let operations = parse_operations(r#"/queue-issue org/repo 'title with "quotes"'"#);
        assert_eq!(
            operations,
            vec![Operation::Addition {
                issue: IssueRequest::new("org/repo", r#"title with "quotes""#),
            }]
        );
    }

    #[test]
    fn queue_issue_with_labels() {
        let operations = parse_operations(r#"/queue-issue org/repo "my title" [label-1][label 2]"#);
        assert_eq!(
            operations,
            vec![Operation::Addition {
                issue: IssueRequest {
                    repo: "org/repo".to_string(),
                    title: "my title".to_string(),
                    labels: vec!["label-1".to_string(), "label 2".to_string()],
                    num: None,
                },
            }]
        );
    }

    #[test]
    fn queue_issue_with_existing_issue_ref() {
        let operations = parse_operations(r#"/queue-issue org/repo#9 "already filed""#);
        assert_eq!(
            operations,
            vec![Operation::Addition {
                issue: IssueRequest {
                    repo: "org/repo".to_string(),
                    title: "already filed".to_string(),
                    labels: vec![],
                    num: Some(9),
                },
            }]
        );
    }

    #[test]
    fn queue_multiple_issues_with_surrounding_prose() {
        let operations = parse_operations(
            r#"These are the issues we should create:

/queue-issue org/repo "issue 1"
/queue-issue org/repo "issue 2" [label-1][label 2]"#,
        );
        assert_eq!(operations.len(), 2);
        assert!(matches!(
            &operations[0],
            Operation::Addition { issue } if issue.title == "issue 1"
        ));
        assert!(matches!(
            &operations[1],
            Operation::Addition { issue } if issue.labels.len() == 2
        ));
    }

    #[test]
    fn unqueue_issues() {
        let operations = parse_operations("\n/unqueue-issue aB123\n/unqueue-issue zy987\n");
        assert_eq!(
            operations,
            vec![
                Operation::Removal {
                    uid: "aB123".to_string()
                },
                Operation::Removal {
                    uid: "zy987".to_string()
                },
            ]
        );
    }

    #[test]
    fn additions_grouped_before_removals() {
        // Two-pass scan: source interleaving is not preserved
        let operations = parse_operations("/unqueue-issue a1\n/queue-issue org/repo \"t\"");
        assert_eq!(
            operations,
            vec![
                Operation::Addition {
                    issue: IssueRequest::new("org/repo", "t"),
                },
                Operation::Removal {
                    uid: "a1".to_string()
                },
            ]
        );
    }

    #[test]
    fn non_command_lines_are_ignored() {
        assert!(parse_operations("just a comment\nqueue-issue org/repo \"no slash\"").is_empty());
        assert!(parse_operations("/queue-issue org/repo no-quoted-title").is_empty());
    }

    #[test]
    fn parse_issue_queued_and_created() {
        let queued = parse_issue(r#"some/repo "a title" [label-1]"#).unwrap();
        assert_eq!(queued.repo, "some/repo");
        assert_eq!(queued.num, None);
        assert_eq!(queued.title, "a title");
        assert_eq!(queued.labels, vec!["label-1"]);

        let created = parse_issue(r#"some/repo#1 "a title" [label-1]"#).unwrap();
        assert_eq!(created.repo, "some/repo");
        assert_eq!(created.num, Some(1));
    }
}
