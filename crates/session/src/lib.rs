//! Retrieve a Letterboxd data export.
//!
//! [`BrowserSession`] drives a headless Chrome through sign-in and triggers
//! the export from inside the signed-in page; [`ArchiveFile`] serves an export
//! that was already downloaded. Both implement [`ExportSource`], which is all
//! the sync pipeline needs to know about.

mod browser;
mod chrome;
mod credential;
pub mod error;
mod file;
mod probe;
mod transport;

pub use crate::browser::{BrowserOptions, BrowserSession};
pub use crate::credential::SessionCredential;
use crate::error::Result;
pub use crate::file::ArchiveFile;
pub use crate::probe::AuthProbe;
pub use crate::transport::TransportPayload;
use async_trait::async_trait;
use std::sync::Arc;

/// Settings page that doubles as the sign-in landing page.
pub const SETTINGS_URL: &str = "https://letterboxd.com/settings/data/";
/// Endpoint that streams the export archive for the signed-in account.
pub const EXPORT_URL: &str = "https://letterboxd.com/data/export/";

/// Shared handle to whichever source a sync fetches from.
pub type SourceHandle = Arc<dyn ExportSource>;

/// Callback for [`SessionEvent`]s as an export session progresses.
pub type Progress<'a> = &'a (dyn Fn(SessionEvent) + Send + Sync);

/// Milestones of an export session, in the order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Authenticating,
    Authenticated,
    ExportTriggered,
    ArchiveRetrieved,
}

/// The raw export archive and its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDownload {
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

/// Somewhere an export archive can be fetched from.
///
/// Either a complete archive comes back, or an error; there is no partial
/// result.
#[async_trait]
pub trait ExportSource: Send + Sync {
    async fn fetch_export(&self, credential: &SessionCredential, progress: Progress<'_>) -> Result<ExportDownload>;
}
