//! Store error types
//!
//! Duplicate inserts and lookup misses are ordinary `bool` / `Option`
//! results. Only caller mistakes that would corrupt the store's meaning
//! (dangling references) and import failures surface as errors.

use crate::store::types::UserId;
use thiserror::Error;

/// Errors that can occur in the store layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// A relationship or weet references a user that was never added
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    /// A user tried to follow themselves
    #[error("User {0} cannot follow themselves")]
    SelfFollow(UserId),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading or decoding failed
    #[error("CSV error: {0}")]
    Csv(String),

    /// Timestamp text matched none of the accepted formats
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A dataset row could not be applied
    #[error("Import error at line {line}: {message}")]
    Import { line: u64, message: String },
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        StoreError::Csv(err.to_string())
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
