//! CLI command implementations

use anyhow::{Result, bail};
use colored::Colorize;
use issueq_core::{Error, IssueRef, LedgerEntry, Operation, decode, parse_operations, render};
use serde::Serialize;
use tracing::{debug, info};

use crate::event::EventPayload;
use crate::github::{BotComment, CreatedIssue, GithubClient};

const TOKEN_REQUIREMENT: &str = "This call requires a GitHub token. It may be provided via the \
                                 '--token' flag or 'GITHUB_TOKEN' environment variable.";

pub fn list(pr: &str, bot: &str, token: Option<String>, json: bool) -> Result<()> {
    let pr_ref: IssueRef = pr.parse()?;
    let client = GithubClient::new(token);

    let comment = client
        .find_first_bot_comment(&pr_ref.owner, &pr_ref.repo, pr_ref.num, bot)?
        .ok_or_else(|| anyhow::anyhow!("No bot comment found on PR!"))?;

    let entries = decode(&comment.body);

    if json {
        println!("{}", serde_json::to_string(&entries)?);
    } else if entries.is_empty() {
        println!("No issues queued.");
    } else {
        for entry in &entries {
            println!("{}", format_entry(entry));
        }
    }

    Ok(())
}

pub fn create(
    pr: &str,
    bot: &str,
    token: Option<String>,
    prepend: Option<&str>,
    json: bool,
) -> Result<()> {
    let pr_ref: IssueRef = pr.parse()?;
    if token.is_none() {
        bail!("{}", TOKEN_REQUIREMENT);
    }
    let client = GithubClient::new(token);

    let (created, errors) = create_queued_issues(&client, &pr_ref, bot, prepend)?;

    if json {
        println!("{}", serde_json::to_string(&created)?);
    } else if created.is_empty() {
        println!("No issues created.");
    } else {
        for record in &created {
            println!(
                "  {} {} -> {}",
                "*".green(),
                record.uid.cyan(),
                record.issue.html_url
            );
        }
    }

    finish(&errors)
}

/// Create every pending queued issue and mark the successes in the status
/// comment. Hard failures (no bot comment, unreadable thread) abort; every
/// per-issue failure and a failed comment update land in the returned error
/// list instead, so one refusal never discards the rest of the batch.
fn create_queued_issues(
    client: &GithubClient,
    pr_ref: &IssueRef,
    bot: &str,
    prepend: Option<&str>,
) -> Result<(Vec<CreatedRecord>, Vec<String>)> {
    let comment = client
        .find_first_bot_comment(&pr_ref.owner, &pr_ref.repo, pr_ref.num, bot)?
        .ok_or_else(|| anyhow::anyhow!("No bot comment found on PR!"))?;

    let entries = decode(&comment.body);
    let issue_body = format!(
        "This issue has been automatically created from pull request {}.",
        pr_ref
    );

    let mut created = Vec::new();
    let mut operations = Vec::new();
    let mut errors = Vec::new();
    for entry in entries.iter().filter(|e| !e.request.is_created()) {
        let title = format!("{}{}", prepend.unwrap_or(""), entry.request.title);
        match client.create_issue(&entry.request.repo, &title, &entry.request.labels, &issue_body) {
            Ok(issue) => {
                operations.push(Operation::Creation {
                    uid: entry.uid.clone(),
                    num: issue.number,
                });
                created.push(CreatedRecord {
                    uid: entry.uid.clone(),
                    issue,
                });
            }
            Err(failure) => match failure.status {
                Some(status) => errors.push(
                    Error::CreateFailed {
                        uid: entry.uid.clone(),
                        status,
                        message: failure.message,
                    }
                    .to_string(),
                ),
                None => errors.push(format!("creating issue {}: {}", entry.uid, failure)),
            },
        }
    }
    debug!("{} created issues", created.len());

    let (updated, apply_errors) = render(entries, &operations);
    errors.extend(apply_errors.iter().map(ToString::to_string));
    debug!("updated comment:\n{}", updated);

    if comment.body != updated {
        if let Err(err) =
            client.update_comment(&pr_ref.owner, &pr_ref.repo, comment.id, &updated)
        {
            errors.push(err.to_string());
        }
    }

    Ok((created, errors))
}

pub fn action(bot: &str, token: Option<String>) -> Result<()> {
    if std::env::var("CI").as_deref() != Ok("true") {
        bail!("Refusing to proceed running action in a non-CI environment!");
    }
    if token.is_none() {
        bail!("{}", TOKEN_REQUIREMENT);
    }

    let payload = EventPayload::load()?;
    let (owner, repo) = payload.repo()?;
    let thread = payload.thread_number()?;
    let client = GithubClient::new(token);

    if payload.sender_login() == Some(bot) {
        info!("Not processing comments from bot account '{}'.", bot);
        return Ok(());
    }

    let operations = match payload.comment.as_ref() {
        Some(comment) => {
            info!("Parsing user comment for operations...");
            parse_operations(&comment.body)
        }
        None => Vec::new(),
    };
    debug!("parsed {} operations", operations.len());

    let bot_comment = client.find_first_bot_comment(&owner, &repo, thread, bot)?;
    let existing = decode(bot_comment.as_ref().map(|c| c.body.as_str()).unwrap_or(""));

    info!("Generating updated status comment...");
    let (updated, errors) = render(existing, &operations);

    if !errors.is_empty() {
        post_error_reply(&client, &payload, &owner, &repo, thread, &errors)?;
    }

    match bot_comment {
        Some(ref comment) if comment.body == updated => {
            info!("Status comment already up to date.");
        }
        Some(BotComment { id, .. }) => {
            info!("Updating status comment...");
            client.update_comment(&owner, &repo, id, &updated)?;
        }
        None => {
            info!("Posting status comment...");
            client.create_issue_comment(&owner, &repo, thread, &updated)?;
        }
    }

    Ok(())
}

/// Render accumulated reconcile errors back to the requesting user, replying
/// in-thread when the trigger was a PR review comment
fn post_error_reply(
    client: &GithubClient,
    payload: &EventPayload,
    owner: &str,
    repo: &str,
    thread: u64,
    errors: &[Error],
) -> Result<()> {
    let bullets: Vec<String> = errors.iter().map(|e| format!("  * {}", e)).collect();
    let user = payload.sender_login().unwrap_or("reviewer");
    let body = format!("@{}, there was a problem:\n{}", user, bullets.join("\n"));
    info!("Posting {} error(s) back to @{}", errors.len(), user);

    match (payload.pull_request.as_ref(), payload.comment.as_ref()) {
        (Some(_), Some(comment)) => {
            client.create_review_reply(owner, repo, thread, comment.id, &body)
        }
        _ => client.create_issue_comment(owner, repo, thread, &body),
    }
}

fn format_entry(entry: &LedgerEntry) -> String {
    let issue = &entry.request;
    let mut labels = String::new();
    if !issue.labels.is_empty() {
        labels = format!(" [{}]", issue.labels.join("]["));
    }
    format!(
        "  {} {} - {} \"{}\"{}",
        "*".dimmed(),
        entry.uid.cyan(),
        issue.repo,
        issue.title,
        labels
    )
}

/// Print accumulated errors and exit 2, matching the legacy tool's contract
/// for partially failed batches
fn finish(errors: &[String]) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    eprintln!("{} Got the following errors:", "✗".red());
    for error in errors {
        eprintln!("  * {}", error);
    }
    std::process::exit(2);
}

#[derive(Debug, Serialize)]
struct CreatedRecord {
    uid: String,
    #[serde(flatten)]
    issue: CreatedIssue,
}

#[cfg(test)]
mod tests {
    use super::*;
    use issueq_core::{IssueRequest, encode};
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    fn read_request(stream: &mut TcpStream) -> String {
        let mut head = Vec::new();
        let mut byte = [0u8; 1];
        while !head.ends_with(b"\r\n\r\n") {
            if stream.read(&mut byte).unwrap() == 0 {
                break;
            }
            head.push(byte[0]);
        }
        let head = String::from_utf8_lossy(&head).to_string();

        let content_length = head
            .lines()
            .find_map(|line| {
                let line = line.to_ascii_lowercase();
                line.strip_prefix("content-length:")
                    .map(|v| v.trim().parse::<usize>().unwrap())
            })
            .unwrap_or(0);
        let mut body = vec![0u8; content_length];
        stream.read_exact(&mut body).unwrap();

        head
    }

    fn respond(stream: &mut TcpStream, status: &str, body: &str) {
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).unwrap();
    }

    #[test]
    fn failed_comment_update_is_collected_not_fatal() {
        let ledger = encode(&[LedgerEntry {
            uid: "14b156".to_string(),
            request: IssueRequest::new("org/repo1", "Issue 1"),
        }]);
        let comments_body = serde_json::json!([{
            "id": 1,
            "body": ledger,
            "user": {"login": "queue-bot"},
            "html_url": "http://example.invalid/c/1",
        }])
        .to_string();
        let created_body =
            serde_json::json!({"number": 5, "html_url": "http://example.invalid/i/5"}).to_string();

        // Fake API: list comments, create issue, then refuse the comment edit
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let mut methods = Vec::new();
            for _ in 0..3 {
                let (mut stream, _) = listener.accept().unwrap();
                let head = read_request(&mut stream);
                let method = head.split_whitespace().next().unwrap_or_default().to_string();
                match method.as_str() {
                    "GET" => respond(&mut stream, "200 OK", &comments_body),
                    "POST" => respond(&mut stream, "201 Created", &created_body),
                    _ => respond(
                        &mut stream,
                        "500 Internal Server Error",
                        r#"{"message":"boom"}"#,
                    ),
                }
                methods.push(method);
            }
            methods
        });

        let client = GithubClient::with_base(format!("http://{}", addr), Some("token".to_string()));
        let pr_ref: IssueRef = "my/rfcs#1".parse().unwrap();
        let (created, errors) = create_queued_issues(&client, &pr_ref, "queue-bot", None).unwrap();

        // The issue was created and recorded even though the edit failed
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].uid, "14b156");
        assert_eq!(created[0].issue.number, 5);

        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("updating comment"), "{}", errors[0]);
        assert!(errors[0].contains("boom"), "{}", errors[0]);

        assert_eq!(server.join().unwrap(), ["GET", "POST", "PATCH"]);
    }
}
