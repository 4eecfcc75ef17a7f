use crate::error::{ErrorKind, Result};
use crate::{ExportDownload, ExportSource, Progress, SessionCredential, SessionEvent};
use async_trait::async_trait;
use exn::ResultExt;
use std::path::PathBuf;

/// An export archive that has already been downloaded by hand.
///
/// No browser and no sign-in: the credential is ignored.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    path: PathBuf,
}
impl ArchiveFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ExportSource for ArchiveFile {
    async fn fetch_export(&self, _credential: &SessionCredential, progress: Progress<'_>) -> Result<ExportDownload> {
        tracing::info!(path = %self.path.display(), "Reading archive from disk");
        let bytes = tokio::fs::read(&self.path).await.or_raise(|| ErrorKind::Io(self.path.clone()))?;
        progress(SessionEvent::ArchiveRetrieved);
        Ok(ExportDownload { bytes, mime_type: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_reads_file_and_reports_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letterboxd-export.zip");
        std::fs::write(&path, b"PK\x05\x06").unwrap();
        let events = Mutex::new(Vec::new());
        let download = ArchiveFile::new(&path)
            .fetch_export(&SessionCredential::default(), &|event| events.lock().unwrap().push(event))
            .await
            .unwrap();
        assert_eq!(download.bytes, b"PK\x05\x06");
        assert_eq!(*events.lock().unwrap(), [SessionEvent::ArchiveRetrieved]);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = ArchiveFile::new("/no/such/export.zip")
            .fetch_export(&SessionCredential::default(), &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io(path) if path.ends_with("export.zip")));
    }
}
