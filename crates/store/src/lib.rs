//! SQLite store for synced films.
//!
//! The store is a mirror, not a source of truth: every sync deletes the whole
//! `films` table and bulk-inserts the fresh export. The [`FilmStore`] trait is
//! the gateway the sync pipeline talks to; [`Repository`] implements it on
//! top of a [`Database`] pool.

mod db;
pub mod error;
mod gateway;
#[cfg(feature = "mock")]
mod mock;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::gateway::{FilmCounts, FilmStore};
#[cfg(feature = "mock")]
pub use crate::mock::{Call, MockStore};
pub use crate::repo::Repository;
use std::sync::Arc;

/// Shared handle to whichever store a sync writes to.
pub type StoreHandle = Arc<dyn FilmStore>;
