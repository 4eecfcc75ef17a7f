//! SQLite pool for the films table.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// A sync writes through one connection at a time; the second serves `status`.
const FILE_POOL_SIZE: u32 = 2;
// Every `:memory:` connection opens a separate database.
const MEMORY_POOL_SIZE: u32 = 1;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const CONNECTION_PRAGMAS: &str = "PRAGMA temp_store = MEMORY; PRAGMA wal_autocheckpoint = 800;";

/// Handle to the SQLite database that holds synced films.
///
/// Migrations run before [`connect`](Self::connect) or
/// [`connect_in_memory`](Self::connect_in_memory) return, so the `films`
/// table always exists. Wrap it in a [`Repository`](crate::Repository) to
/// read or replace films.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file at `path`, along with any
    /// missing parent directories.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Database)?;
        }
        let options = Self::options()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        Self::open(options, FILE_POOL_SIZE).await
    }

    /// A private, empty database that disappears with its connection.
    ///
    /// Not test-only, so that other crates' tests can use it too.
    pub async fn connect_in_memory() -> Result<Self> {
        Self::open(Self::options().filename(":memory:"), MEMORY_POOL_SIZE).await
    }

    fn options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            // Something else (a web app, say) may be reading the table mid-sync.
            .busy_timeout(BUSY_TIMEOUT)
    }

    async fn open(options: SqliteConnectOptions, pool_size: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .after_connect(|conn, meta| Box::pin(Self::on_connect(conn, meta)))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn on_connect(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(CONNECTION_PRAGMAS).execute(conn).await?;
        Ok(())
    }

    #[instrument("migrating films database", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Let SQLite refresh its planner statistics, then close every connection.
    pub async fn close(&self) {
        if let Err(err) = sqlx::query("PRAGMA optimize").execute(&self.pool).await {
            tracing::debug!(error = %err, "PRAGMA optimize failed");
        }
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_has_films_table() {
        let db = Database::connect_in_memory().await.unwrap();
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_all.sql")).fetch_one(db.pool()).await.unwrap();
        assert_eq!(count, 0);
        let checkpoint: i64 = sqlx::query_scalar("PRAGMA wal_autocheckpoint").fetch_one(db.pool()).await.unwrap();
        assert_eq!(checkpoint, 800);
        db.close().await;
        assert!(db.pool().is_closed());
    }

    #[tokio::test]
    async fn test_migrating_twice_is_harmless() {
        let db = Database::connect_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_connect_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("films.sqlite");
        let db = Database::connect(&path).await.unwrap();
        db.close().await;
        assert!(path.is_file());
        // Reopening an existing database keeps its migration history.
        let db = Database::connect(&path).await.unwrap();
        db.close().await;
    }
}
