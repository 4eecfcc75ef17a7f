//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The buffer does not start with a zip signature. Don't retry with the same input.
    #[display("not a zip archive")]
    NotAnArchive,
    /// The buffer looked like a zip container, but the central directory is unreadable.
    #[display("invalid or corrupted archive")]
    InvalidArchive,
    /// A single entry could not be decompressed.
    #[display("unreadable archive entry: {_0}")]
    Entry(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The bytes are already in memory; the archive is either valid or it's not.
        false
    }
}
