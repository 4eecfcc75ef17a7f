//! Persistence gateway trait.

use crate::error::Result;
use async_trait::async_trait;
use filmsync_records::FilmRecord;

/// Number of stored films per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilmCounts {
    pub watched: u64,
    pub towatch: u64,
}
impl FilmCounts {
    pub fn total(&self) -> u64 {
        self.watched + self.towatch
    }
}

/// Where synced films end up.
///
/// Every sync is a full replace: delete everything, then insert the new set.
/// Whether those two steps are atomic is up to the implementation; see
/// [`replace_all()`](Self::replace_all).
#[async_trait]
pub trait FilmStore: Send + Sync {
    /// Delete every stored film, returning how many were removed.
    async fn delete_all(&self) -> Result<u64>;

    /// Insert `films` in order, returning how many rows were written.
    ///
    /// Implementations may skip individual films that can't be represented
    /// in the store (logging them); that is not an error. Failing to execute
    /// the insert is.
    async fn bulk_insert(&self, films: &[FilmRecord]) -> Result<u64>;

    /// Replace the stored films with `films`.
    ///
    /// The default implementation deletes and then inserts with no rollback:
    /// if the insert fails after the delete succeeded, the store is left
    /// empty. Implementations that can do better should override this.
    async fn replace_all(&self, films: &[FilmRecord]) -> Result<u64> {
        let deleted = self.delete_all().await?;
        tracing::debug!(deleted, "Deleted existing films");
        self.bulk_insert(films).await
    }

    async fn count_by_status(&self) -> Result<FilmCounts>;
}
