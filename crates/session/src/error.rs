//! Session Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A session error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    /// The browser configuration was rejected before launch.
    #[display("invalid browser configuration: {_0}")]
    BrowserConfig(#[error(not(source))] String),
    #[display("failed to launch browser")]
    Launch,
    #[display("page navigation failed")]
    Navigation,
    #[display("page navigation timed out")]
    NavigationTimeout,
    /// The page is signed out but the sign-in form isn't where it should be.
    #[display("sign-in form element not found: {_0}")]
    LoginFormMissing(#[error(not(source))] &'static str),
    /// Credentials were submitted but the site still shows a signed-out page.
    #[display("sign-in was not accepted")]
    AuthenticationFailed,
    /// The export endpoint answered with a non-OK HTTP status.
    #[display("export request rejected: {status} {status_text}")]
    ExportRejected {
        status: u16,
        status_text: String,
    },
    /// The export body could not be carried out of the page intact.
    #[display("invalid export transport payload")]
    Transport,
    /// Any other failure while scripting the browser.
    #[display("browser automation error")]
    Automation,
    #[display("could not read export archive: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Navigation | Self::NavigationTimeout | Self::Automation => true,
            Self::ExportRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        let rejected = ErrorKind::ExportRejected { status: 403, status_text: "Forbidden".to_string() };
        assert_eq!(rejected.to_string(), "export request rejected: 403 Forbidden");
        assert_eq!(ErrorKind::LoginFormMissing("#signin-form").to_string(), "sign-in form element not found: #signin-form");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::ExportRejected { status: 502, status_text: "Bad Gateway".to_string() }.is_retryable());
        assert!(!ErrorKind::ExportRejected { status: 403, status_text: "Forbidden".to_string() }.is_retryable());
        assert!(!ErrorKind::AuthenticationFailed.is_retryable());
    }
}
