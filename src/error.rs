//! Sync Error Types
//!
//! Each variant names the pipeline step that failed; the component error
//! that caused it hangs underneath in the `exn` tree.

use derive_more::{Display, Error};

/// A sync error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("export session failed")]
    Session,
    #[display("could not open export archive")]
    Archive,
    #[display("could not parse export entry")]
    Parse,
    #[display("could not persist films")]
    Persistence,
    #[display("could not load configuration")]
    Config,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Nothing in the pipeline retries on its own; this is for whoever
    /// schedules the next run.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Session | Self::Persistence)
    }
}
