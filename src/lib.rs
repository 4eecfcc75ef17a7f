//! Mirror a Letterboxd account's diary and watchlist into a local table.
//!
//! A [`Pipeline`] fetches the account's data export from an
//! [`ExportSource`](filmsync_session::ExportSource), unpacks the diary and
//! watchlist CSVs, turns them into [`FilmRecord`](filmsync_records::FilmRecord)s
//! and fully replaces the contents of a [`FilmStore`](filmsync_store::FilmStore).

pub mod error;
mod pipeline;
mod stage;

pub use crate::pipeline::{DIARY_ENTRY, Pipeline, Summary, WATCHLIST_ENTRY};
pub use crate::stage::Stage;
