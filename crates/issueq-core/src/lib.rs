//! issueq-core: Core library for the issueq queue tracker
//!
//! Implements the ledger protocol behind the `/queue-issue` review workflow:
//! parsing operator commands out of comment text, encoding/decoding the
//! queued-issue ledger to and from the persistent status comment, generating
//! content-derived short ids, and reconciling batches of operations against
//! the ledger with partial-failure semantics. No I/O happens here - fetching
//! and posting comments is the CLI's job.

pub mod error;
pub mod ledger;
pub mod parse;
pub mod reconcile;
pub mod request;
pub mod uid;

pub use error::Error;
pub use ledger::{decode, encode};
pub use parse::parse_operations;
pub use reconcile::{apply, render};
pub use request::{IssueRef, IssueRequest, LedgerEntry, Operation};
pub use uid::entry_uid;

/// Result type for issueq operations
pub type Result<T> = std::result::Result<T, Error>;
