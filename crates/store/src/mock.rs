//! In-memory persistence gateway for testing.

use crate::error::{ErrorKind, Result};
use crate::gateway::{FilmCounts, FilmStore};
use async_trait::async_trait;
use filmsync_records::{FilmRecord, Status};
use tokio::sync::RwLock;

/// A gateway operation recorded by [`MockStore`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DeleteAll,
    BulkInsert(usize),
}

/// In-memory gateway for testing.
///
/// Films are stored in a `Vec` behind a [`RwLock`]. Uses the default,
/// non-atomic [`FilmStore::replace_all`], so a failed insert after a
/// successful delete leaves the store empty.
///
/// # Examples
///
/// ```
/// use filmsync_store::{FilmStore, MockStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MockStore::default().failing_bulk_insert();
/// assert!(store.replace_all(&[]).await.is_err());
/// assert!(store.films().await.is_empty());
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    films: RwLock<Vec<FilmRecord>>,
    calls: RwLock<Vec<Call>>,
    fail_delete: bool,
    fail_insert: bool,
}

impl MockStore {
    /// Create a mock store pre-populated with films.
    pub fn with_films(films: impl IntoIterator<Item = FilmRecord>) -> Self {
        Self {
            films: RwLock::new(films.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Make every [`delete_all`](FilmStore::delete_all) fail.
    pub fn failing_delete_all(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    /// Make every [`bulk_insert`](FilmStore::bulk_insert) fail.
    pub fn failing_bulk_insert(mut self) -> Self {
        self.fail_insert = true;
        self
    }

    /// Snapshot of the stored films.
    pub async fn films(&self) -> Vec<FilmRecord> {
        self.films.read().await.clone()
    }

    /// Snapshot of the gateway calls made so far.
    pub async fn calls(&self) -> Vec<Call> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl FilmStore for MockStore {
    async fn delete_all(&self) -> Result<u64> {
        self.calls.write().await.push(Call::DeleteAll);
        if self.fail_delete {
            exn::bail!(ErrorKind::Database);
        }
        let mut films = self.films.write().await;
        let deleted = films.len() as u64;
        films.clear();
        Ok(deleted)
    }

    async fn bulk_insert(&self, films: &[FilmRecord]) -> Result<u64> {
        self.calls.write().await.push(Call::BulkInsert(films.len()));
        if self.fail_insert {
            exn::bail!(ErrorKind::Database);
        }
        self.films.write().await.extend_from_slice(films);
        Ok(films.len() as u64)
    }

    async fn count_by_status(&self) -> Result<FilmCounts> {
        let films = self.films.read().await;
        let watched = films.iter().filter(|f| f.status == Status::Watched).count() as u64;
        Ok(FilmCounts {
            watched,
            towatch: films.len() as u64 - watched,
        })
    }
}
