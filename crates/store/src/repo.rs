//! SQLite implementation of the persistence gateway.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::gateway::{FilmCounts, FilmStore};
use crate::models::FilmRow;
use async_trait::async_trait;
use exn::ResultExt;
use filmsync_records::{FilmRecord, Status};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use time::UtcDateTime;
use tracing::instrument;

const INSERT_PREFIX: &str = "INSERT INTO films (name, year, link, status, date_updated, rating, synced_at) ";
// SQLite allows 32766 bound parameters per statement and each row binds 7.
const MAX_ROWS_PER_STATEMENT: usize = 4096;

/// Repository for the `films` table.
///
/// Replacing is atomic by default: the delete and the insert run in one
/// transaction, so a failed insert leaves the previous films in place. Turn
/// it off with [`with_atomic_replace(false)`](Self::with_atomic_replace) to
/// get the plain delete-then-insert behaviour of [`FilmStore`].
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    dry_run: bool,
    atomic: bool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false, atomic: true }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run, atomic: true }
    }

    pub fn with_atomic_replace(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// All stored films, in insertion order.
    pub async fn list(&self) -> Result<Vec<FilmRecord>> {
        let rows: Vec<FilmRow> = sqlx::query_as(include_str!("../queries/list_films.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(FilmRecord::try_from).collect()
    }

    async fn count_all(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_all.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }

    /// Convert films to rows, leaving out (and logging) any that can't be
    /// stored. One bad film doesn't hold up the rest of the batch.
    fn rows_for(films: &[FilmRecord]) -> Vec<FilmRow> {
        let synced_at = UtcDateTime::now().unix_timestamp();
        films
            .iter()
            .filter_map(|film| match FilmRow::from_record(film, synced_at) {
                Ok(row) => Some(row),
                Err(err) => {
                    tracing::warn!(name = %film.name, link = %film.link, error = ?err, "Failed to build insert values; skipping film");
                    None
                },
            })
            .collect()
    }

    async fn delete_all_in(conn: &mut SqliteConnection) -> Result<u64> {
        let result = sqlx::query(include_str!("../queries/delete_all.sql"))
            .execute(&mut *conn)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected())
    }

    async fn insert_rows_in(conn: &mut SqliteConnection, rows: Vec<FilmRow>) -> Result<u64> {
        let mut inserted = 0;
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(INSERT_PREFIX);
            builder.push_values(rows.by_ref().take(MAX_ROWS_PER_STATEMENT), |mut values, row| {
                values
                    .push_bind(row.name)
                    .push_bind(row.year)
                    .push_bind(row.link)
                    .push_bind(row.status)
                    .push_bind(row.date_updated)
                    .push_bind(row.rating)
                    .push_bind(row.synced_at);
            });
            let result = builder.build().execute(&mut *conn).await.or_raise(|| ErrorKind::Database)?;
            inserted += result.rows_affected();
        }
        Ok(inserted)
    }
}

#[async_trait]
impl FilmStore for Repository {
    #[instrument(skip(self), fields(dry_run = self.dry_run))]
    async fn delete_all(&self) -> Result<u64> {
        if self.dry_run {
            return self.count_all().await;
        }
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        Self::delete_all_in(&mut conn).await
    }

    #[instrument(skip_all, fields(films = films.len(), dry_run = self.dry_run))]
    async fn bulk_insert(&self, films: &[FilmRecord]) -> Result<u64> {
        let rows = Self::rows_for(films);
        if self.dry_run || rows.is_empty() {
            return Ok(rows.len() as u64);
        }
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        Self::insert_rows_in(&mut conn, rows).await
    }

    #[instrument(skip_all, fields(films = films.len(), atomic = self.atomic, dry_run = self.dry_run))]
    async fn replace_all(&self, films: &[FilmRecord]) -> Result<u64> {
        if self.dry_run || !self.atomic {
            let deleted = self.delete_all().await?;
            tracing::debug!(deleted, "Deleted existing films");
            return self.bulk_insert(films).await;
        }
        let rows = Self::rows_for(films);
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let deleted = Self::delete_all_in(&mut tx).await?;
        tracing::debug!(deleted, "Deleted existing films");
        // Dropping the transaction on error rolls it back.
        let inserted = Self::insert_rows_in(&mut tx, rows).await?;
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(inserted)
    }

    async fn count_by_status(&self) -> Result<FilmCounts> {
        let rows: Vec<(String, i64)> = sqlx::query_as(include_str!("../queries/count_by_status.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let mut counts = FilmCounts::default();
        for (status, count) in rows {
            let count = u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))?;
            match status.parse::<Status>() {
                Ok(Status::Watched) => counts.watched = count,
                Ok(Status::ToWatch) => counts.towatch = count,
                Err(_) => tracing::warn!(status = %status, count, "Ignoring films with an unknown status"),
            }
        }
        Ok(counts)
    }
}
