//! Batch reconciliation of operations against the ledger
//!
//! Partial-failure by design: every operation is attempted, failures are
//! collected, and nothing is rolled back. One bad `/unqueue-issue` must not
//! discard the rest of a reviewer's batch.

use crate::request::{LedgerEntry, Operation};
use crate::uid::entry_uid;
use crate::{Error, ledger};

/// Apply a batch of operations to the ledger, in order
///
/// Returns the updated entry sequence and every error encountered. Additions
/// always succeed (the uid is assigned here); removals fail on unknown uids
/// and on entries already created; creations fail on unknown uids and
/// otherwise set `num` unconditionally, silently overwriting a previous
/// value. A uid can name several entries (identical additions share one, and
/// truncated hashes can collide): removal guards on the first match in
/// ledger order but then drops every entry carrying the uid, while creation
/// marks only the first match.
pub fn apply(
    mut entries: Vec<LedgerEntry>,
    operations: &[Operation],
) -> (Vec<LedgerEntry>, Vec<Error>) {
    let mut errors = Vec::new();

    for operation in operations {
        match operation {
            Operation::Addition { issue } => {
                entries.push(LedgerEntry {
                    uid: entry_uid(issue),
                    request: issue.clone(),
                });
            }
            Operation::Removal { uid } => {
                let Some(entry) = entries.iter().find(|e| &e.uid == uid) else {
                    errors.push(Error::EntryNotFound(uid.clone()));
                    continue;
                };
                if entry.request.is_created() {
                    errors.push(Error::AlreadyCreated(uid.clone()));
                    continue;
                }
                entries.retain(|e| &e.uid != uid);
            }
            Operation::Creation { uid, num } => {
                let Some(entry) = entries.iter_mut().find(|e| &e.uid == uid) else {
                    errors.push(Error::EntryNotFound(uid.clone()));
                    continue;
                };
                entry.request.num = Some(*num);
            }
        }
    }

    (entries, errors)
}

/// Apply a batch and render the resulting status comment body
///
/// This is the call the orchestration layer makes per event: decode the
/// current comment, pass the entries and the parsed operations here, write
/// back the returned text, surface the returned errors to the requester.
pub fn render(entries: Vec<LedgerEntry>, operations: &[Operation]) -> (String, Vec<Error>) {
    let (entries, errors) = apply(entries, operations);
    (ledger::encode(&entries), errors)
}
