use crate::Stage;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use filmsync_archive::ExportArchive;
use filmsync_records::{RawRow, Status};
use filmsync_session::{SessionCredential, SessionEvent, SourceHandle};
use filmsync_store::StoreHandle;
use std::sync::{Mutex, PoisonError};
use tracing::instrument;

/// Archive entry holding every diary (watched) entry.
pub const DIARY_ENTRY: &str = "diary.csv";
/// Archive entry holding the watchlist.
pub const WATCHLIST_ENTRY: &str = "watchlist.csv";

/// What a successful run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Films taken from the diary.
    pub watched: usize,
    /// Films taken from the watchlist.
    pub towatch: usize,
    /// Rows left out for missing a name, year or link.
    pub dropped: usize,
    /// Rows the store reports writing.
    pub inserted: u64,
}

/// One full sync: export, extract, transform, replace.
///
/// The first failure ends the run; nothing is retried. The store is only
/// touched once everything before it has succeeded.
pub struct Pipeline {
    source: SourceHandle,
    store: StoreHandle,
    credential: SessionCredential,
    stage: Mutex<Stage>,
}
impl Pipeline {
    pub fn new(source: SourceHandle, store: StoreHandle, credential: SessionCredential) -> Self {
        Self { source, store, credential, stage: Mutex::new(Stage::Idle) }
    }

    /// The stage the current (or last) run reached.
    pub fn stage(&self) -> Stage {
        *self.stage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, next: Stage) {
        let mut stage = self.stage.lock().unwrap_or_else(PoisonError::into_inner);
        if *stage != next {
            tracing::debug!(from = %*stage, to = %next, "Sync stage changed");
            *stage = next;
        }
    }

    fn on_session_event(&self, event: SessionEvent) {
        match event {
            SessionEvent::Authenticating => self.advance(Stage::Authenticating),
            SessionEvent::Authenticated => tracing::debug!("Export session authenticated"),
            SessionEvent::ExportTriggered => self.advance(Stage::ExportTriggered),
            SessionEvent::ArchiveRetrieved => self.advance(Stage::ArchiveRetrieved),
        }
    }

    /// Run the sync once, from fetching the export to replacing the store.
    #[instrument(skip(self), fields(username = %self.credential.username()))]
    pub async fn run(&self) -> Result<Summary> {
        self.advance(Stage::Idle);
        tracing::info!("Starting update");
        match self.run_stages().await {
            Ok(summary) => {
                self.advance(Stage::Done);
                tracing::info!(
                    watched = summary.watched,
                    towatch = summary.towatch,
                    dropped = summary.dropped,
                    inserted = summary.inserted,
                    "Finished"
                );
                Ok(summary)
            },
            Err(err) => {
                let failed_at = self.stage();
                self.advance(Stage::Failed);
                tracing::error!(stage = %failed_at, "Update ended on critical error");
                Err(err)
            },
        }
    }

    async fn run_stages(&self) -> Result<Summary> {
        self.advance(Stage::Authenticating);
        let download = self
            .source
            .fetch_export(&self.credential, &|event| self.on_session_event(event))
            .await
            .or_raise(|| ErrorKind::Session)?;
        self.advance(Stage::ArchiveRetrieved);

        tracing::info!(size = download.bytes.len(), mime = ?download.mime_type, "Unzipping archive");
        let archive = filmsync_archive::extract(&download.bytes).or_raise(|| ErrorKind::Archive)?;
        self.advance(Stage::Extracted);

        tracing::info!("Converting CSV");
        let diary = entry_rows(&archive, DIARY_ENTRY)?;
        let watchlist = entry_rows(&archive, WATCHLIST_ENTRY)?;
        let watched = filmsync_records::transform(&diary, Status::Watched);
        let towatch = filmsync_records::transform(&watchlist, Status::ToWatch);
        let mut summary = Summary {
            watched: watched.len(),
            towatch: towatch.len(),
            dropped: (diary.len() - watched.len()) + (watchlist.len() - towatch.len()),
            inserted: 0,
        };
        let films = filmsync_records::merge(watched, towatch);
        self.advance(Stage::Transformed);

        tracing::info!(films = films.len(), "Persisting films");
        summary.inserted = self.store.replace_all(&films).await.or_raise(|| ErrorKind::Persistence)?;
        self.advance(Stage::Persisted);
        Ok(summary)
    }
}

/// Parse one CSV entry of the archive. A missing entry is treated as an
/// empty list, which empties that status in the store.
fn entry_rows(archive: &ExportArchive, name: &str) -> Result<Vec<RawRow>> {
    let Some(text) = archive.get(name) else {
        tracing::warn!(entry = name, "Export archive has no such entry; treating it as empty");
        return Ok(Vec::new());
    };
    let rows = filmsync_records::parse_rows(text).or_raise(|| ErrorKind::Parse)?;
    tracing::debug!(entry = name, rows = rows.len(), "Parsed archive entry");
    Ok(rows)
}
