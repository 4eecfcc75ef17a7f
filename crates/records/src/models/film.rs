use crate::models::{RawRow, Status};
use crate::consts::{DATE, LINK, NAME, RATING, WATCHED_DATE, YEAR};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Calendar date format used by the exports (and the `date_updated` column).
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A validated film entry from either the diary or the watchlist.
///
/// Only constructed through [`FilmRecord::from_row`] (or directly in tests),
/// which guarantees `name` and `link` are non-empty and `year` is non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmRecord {
    pub name: String,
    pub year: i32,
    /// Canonical Letterboxd URL; identifies the film (or diary entry).
    pub link: String,
    pub status: Status,
    pub date_updated: Option<Date>,
    pub rating: Option<f64>,
}
impl FilmRecord {
    /// Build a record from one CSV row, tagging it with `status`.
    ///
    /// Returns [`None`] when any of name, year or link is missing, empty, or
    /// (for the year) unparseable or zero. Dropping these rows is expected
    /// behaviour for malformed export lines, not an error.
    ///
    /// The diary names its date column `Watched Date` and the watchlist
    /// `Date`; the former wins when both are present.
    pub fn from_row(row: &RawRow, status: Status) -> Option<Self> {
        let name = row.get(NAME)?.to_string();
        let year = row.get(YEAR)?.trim().parse::<i32>().ok().filter(|y| *y != 0)?;
        let link = row.get(LINK)?.to_string();
        let date_updated = row.get(WATCHED_DATE).or_else(|| row.get(DATE)).and_then(parse_date);
        let rating = row.get(RATING).and_then(|r| r.trim().parse::<f64>().ok());
        Some(Self { name, year, link, status, date_updated, rating })
    }
}

fn parse_date(value: &str) -> Option<Date> {
    match Date::parse(value.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::debug!(value, "Ignoring unparseable export date");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::Month;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_diary_row_uses_watched_date() {
        let diary = row(&[
            ("Date", "2021-05-02"),
            ("Name", "Stalker"),
            ("Year", "1979"),
            ("Letterboxd URI", "https://boxd.it/2bcA"),
            ("Rating", "4.5"),
            ("Watched Date", "2021-05-01"),
        ]);
        let film = FilmRecord::from_row(&diary, Status::Watched).unwrap();
        assert_eq!(film.name, "Stalker");
        assert_eq!(film.year, 1979);
        assert_eq!(film.link, "https://boxd.it/2bcA");
        assert_eq!(film.status, Status::Watched);
        assert_eq!(film.date_updated, Some(Date::from_calendar_date(2021, Month::May, 1).unwrap()));
        assert_eq!(film.rating, Some(4.5));
    }

    #[test]
    fn test_watched_date_without_date_column() {
        let diary = row(&[("Name", "Stalker"), ("Year", "1979"), ("Letterboxd URI", "https://boxd.it/2bcA"), ("Watched Date", "2021-05-01")]);
        let film = FilmRecord::from_row(&diary, Status::Watched).unwrap();
        assert_eq!(film.date_updated, Some(Date::from_calendar_date(2021, Month::May, 1).unwrap()));
    }

    #[test]
    fn test_watchlist_row_falls_back_to_date() {
        let watchlist = row(&[("Date", "2021-06-01"), ("Name", "Paris, Texas"), ("Year", "1984"), ("Letterboxd URI", "https://boxd.it/29Wu")]);
        let film = FilmRecord::from_row(&watchlist, Status::ToWatch).unwrap();
        assert_eq!(film.status, Status::ToWatch);
        assert_eq!(film.date_updated, Some(Date::from_calendar_date(2021, Month::June, 1).unwrap()));
        assert_eq!(film.rating, None);
    }

    #[test]
    fn test_empty_watched_date_falls_back_to_date() {
        let diary = row(&[("Date", "2021-06-01"), ("Name", "Heat"), ("Year", "1995"), ("Letterboxd URI", "https://boxd.it/2a0Q"), ("Watched Date", "")]);
        let film = FilmRecord::from_row(&diary, Status::Watched).unwrap();
        assert_eq!(film.date_updated, Some(Date::from_calendar_date(2021, Month::June, 1).unwrap()));
    }

    #[rstest]
    #[case::missing_name(&[("Year", "1979"), ("Letterboxd URI", "https://boxd.it/2bcA")])]
    #[case::empty_name(&[("Name", ""), ("Year", "1979"), ("Letterboxd URI", "https://boxd.it/2bcA")])]
    #[case::missing_year(&[("Name", "Stalker"), ("Letterboxd URI", "https://boxd.it/2bcA")])]
    #[case::zero_year(&[("Name", "Stalker"), ("Year", "0"), ("Letterboxd URI", "https://boxd.it/2bcA")])]
    #[case::garbage_year(&[("Name", "Stalker"), ("Year", "nineteen"), ("Letterboxd URI", "https://boxd.it/2bcA")])]
    #[case::missing_link(&[("Name", "Stalker"), ("Year", "1979")])]
    #[case::empty_link(&[("Name", "Stalker"), ("Year", "1979"), ("Letterboxd URI", "")])]
    fn test_invalid_rows_are_dropped(#[case] pairs: &[(&str, &str)]) {
        assert!(FilmRecord::from_row(&row(pairs), Status::Watched).is_none());
    }

    #[rstest]
    #[case("", None)]
    #[case("3", Some(3.0))]
    #[case(" 2.5 ", Some(2.5))]
    #[case("five", None)]
    fn test_rating(#[case] rating: &str, #[case] expected: Option<f64>) {
        let film = FilmRecord::from_row(
            &row(&[("Name", "Heat"), ("Year", "1995"), ("Letterboxd URI", "https://boxd.it/2a0Q"), ("Rating", rating)]),
            Status::Watched,
        )
        .unwrap();
        assert_eq!(film.rating, expected);
    }

    #[test]
    fn test_unparseable_date_keeps_row() {
        let film = FilmRecord::from_row(
            &row(&[("Name", "Heat"), ("Year", "1995"), ("Letterboxd URI", "https://boxd.it/2a0Q"), ("Date", "01/06/2021")]),
            Status::ToWatch,
        )
        .unwrap();
        assert_eq!(film.date_updated, None);
    }
}
