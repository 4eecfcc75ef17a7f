//! Film records parsed from Letterboxd CSV exports.
//!
//! The export contains one CSV file per list. This crate turns their text
//! into [`RawRow`]s ([`parse_rows`]) and then into validated [`FilmRecord`]s
//! ([`transform`]), silently discarding rows that are missing a name, year
//! or link.

mod consts;
pub mod error;
pub mod models;
mod parse;

pub use crate::models::{DATE_FORMAT, FilmRecord, RawRow, Status};
pub use crate::parse::parse_rows;
use tracing::instrument;

/// Convert raw rows into film records tagged with `status`.
///
/// Output preserves input order and is never longer than the input. Rows that
/// fail validation (see [`FilmRecord::from_row`]) are dropped without error;
/// only their count is logged.
#[instrument(skip(rows), fields(rows = rows.len(), status = %status))]
pub fn transform(rows: &[RawRow], status: Status) -> Vec<FilmRecord> {
    let films = rows.iter().filter_map(|row| FilmRecord::from_row(row, status)).collect::<Vec<_>>();
    let dropped = rows.len() - films.len();
    if dropped > 0 {
        tracing::debug!(dropped, "Dropped rows missing a name, year or link");
    }
    films
}

/// Concatenate the two lists: every watched film first, then every film to
/// watch, each in its original order.
pub fn merge(watched: Vec<FilmRecord>, towatch: Vec<FilmRecord>) -> Vec<FilmRecord> {
    let mut merged = watched;
    merged.extend(towatch);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIARY: &str = "Date,Name,Year,Letterboxd URI,Rating,Rewatch,Tags,Watched Date\n\
        2021-05-02,Stalker,1979,https://boxd.it/2bcA,4.5,,,2021-05-01\n\
        2021-05-03,Untitled Short,,https://boxd.it/9zzz,,,,2021-05-03\n\
        2021-05-04,Heat,1995,https://boxd.it/2a0Q,4,Yes,,2021-05-04\n";

    fn film(name: &str, status: Status) -> FilmRecord {
        FilmRecord {
            name: name.to_string(),
            year: 2000,
            link: format!("https://boxd.it/{name}"),
            status,
            date_updated: None,
            rating: None,
        }
    }

    #[test]
    fn test_transform_filters_and_tags() {
        let rows = parse_rows(DIARY).unwrap();
        let films = transform(&rows, Status::Watched);
        assert!(films.len() <= rows.len());
        assert_eq!(films.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), ["Stalker", "Heat"]);
        assert!(films.iter().all(|f| f.status == Status::Watched));
        assert!(films.iter().all(|f| !f.name.is_empty() && f.year != 0 && !f.link.is_empty()));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let rows = parse_rows(DIARY).unwrap();
        assert_eq!(transform(&rows, Status::ToWatch), transform(&rows, Status::ToWatch));
    }

    #[test]
    fn test_transform_empty() {
        assert!(transform(&[], Status::Watched).is_empty());
    }

    #[test]
    fn test_merge_order() {
        let watched = vec![film("b", Status::Watched), film("a", Status::Watched)];
        let towatch = vec![film("d", Status::ToWatch), film("c", Status::ToWatch)];
        let merged = merge(watched, towatch);
        let names = merged.iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["b", "a", "d", "c"]);
        let first_towatch = merged.iter().position(|f| f.status == Status::ToWatch).unwrap();
        assert!(merged[..first_towatch].iter().all(|f| f.status == Status::Watched));
        assert!(merged[first_towatch..].iter().all(|f| f.status == Status::ToWatch));
    }
}
