//! Error types for issueq
//!
//! Message text is rendered back to reviewers in reply comments, so the
//! wording is part of the protocol surface and must stay stable.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Issue with uid '{0}' not found!")]
    EntryNotFound(String),

    #[error("Cannot unqueue '{0}' since it was already created!")]
    AlreadyCreated(String),

    #[error("creating issue {uid}: response=[status={status},msg={message}]")]
    CreateFailed {
        uid: String,
        status: u16,
        message: String,
    },

    #[error("Invalid issue reference '{0}'! Expected format '{{owner}}/{{repo}}#{{number}}'.")]
    InvalidReference(String),
}
