//! Ledger codec: the persistent status comment
//!
//! The whole ledger lives inside a single bot-authored comment. `encode`
//! renders an ordered entry list into the fixed comment template; `decode`
//! scans a comment body back into entries. Order is document order and
//! survives a round trip, as does everything else provided titles contain no
//! line breaks and labels no `]`.

use crate::parse::parse_issue;
use crate::request::LedgerEntry;
use regex::Regex;
use std::sync::OnceLock;

/// Marker for an entry whose tracker issue exists
pub const CREATED_MARK: &str = "✅";
/// Marker for an entry still waiting to be created
pub const PENDING_MARK: &str = "⬜️";

/// Rendered in place of the entry list when the ledger is empty
pub const NONE_SENTINEL: &str = "__(none)__";

const TEMPLATE: &str = r#"Maintainers,

As you review this RFC please queue up issues to be created using the following commands:

    queue-issue <repo> "<title>" [labels]...
    unqueue-issue <uid>

### Issues

__ISSUES__
"#;

static ENTRY_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

fn entry_line_regex() -> &'static Regex {
    ENTRY_LINE_REGEX.get_or_init(|| {
        Regex::new(r"(?m)\*\s+(✅|⬜️)\s+(\S+)\s+-\s+(.*)$").expect("entry regex should compile")
    })
}

/// Render a ledger into the status comment body
pub fn encode(entries: &[LedgerEntry]) -> String {
    let mut output = String::new();

    if entries.is_empty() {
        output.push_str(NONE_SENTINEL);
    } else {
        for entry in entries {
            let issue = &entry.request;
            let marker = if issue.is_created() {
                CREATED_MARK
            } else {
                PENDING_MARK
            };
            let repo_ref = match issue.num {
                Some(num) => format!("{}#{}", issue.repo, num),
                None => issue.repo.clone(),
            };

            let mut labels = String::new();
            if !issue.labels.is_empty() {
                labels = format!(" [{}]", issue.labels.join("]["));
            }

            output.push_str(&format!(
                "  * {} {} - {} \"{}\"{}\n",
                marker, entry.uid, repo_ref, issue.title, labels
            ));
        }
    }

    TEMPLATE.replace("__ISSUES__", output.trim_end())
}

/// Scan a comment body for ledger entries, in document order
///
/// Lines that do not look like entry rows are skipped. The marker glyph is
/// not trusted: created-ness comes solely from the `#<num>` suffix on the
/// repo reference, which is what `encode` keeps the glyph in sync with.
pub fn decode(text: &str) -> Vec<LedgerEntry> {
    let mut entries = Vec::new();

    for capture in entry_line_regex().captures_iter(text) {
        if let Some(request) = parse_issue(&capture[3]) {
            entries.push(LedgerEntry {
                uid: capture[2].to_string(),
                request,
            });
        }
    }

    entries
}
