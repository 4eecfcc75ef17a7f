use crate::error::{Error, ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use filmsync_records::{DATE_FORMAT, FilmRecord, Status};
use time::Date;

/// Column values for one row of the `films` table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FilmRow {
    pub(crate) name: String,
    pub(crate) year: i64,
    pub(crate) link: String,
    pub(crate) status: String,
    #[sqlx(default)]
    pub(crate) date_updated: Option<String>,
    #[sqlx(default)]
    pub(crate) rating: Option<f64>,
    pub(crate) synced_at: i64,
}
impl FilmRow {
    /// Column values for `film`, stamped with the time of the sync.
    ///
    /// Fails with [`ErrorKind::InvalidData`] for values SQLite can't store
    /// faithfully (NaN and infinite ratings bind as NULL, which would silently
    /// turn "rated" into "unrated").
    pub(crate) fn from_record(film: &FilmRecord, synced_at: i64) -> Result<Self> {
        let rating = match film.rating {
            Some(rating) if !rating.is_finite() => exn::bail!(ErrorKind::InvalidData("rating")),
            rating => rating,
        };
        Ok(Self {
            name: film.name.clone(),
            year: i64::from(film.year),
            link: film.link.clone(),
            status: film.status.as_str().to_string(),
            date_updated: film
                .date_updated
                .map(|date| date.format(DATE_FORMAT))
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("date updated"))?,
            rating,
            synced_at,
        })
    }
}
impl TryFrom<FilmRow> for FilmRecord {
    type Error = Error;
    fn try_from(row: FilmRow) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: row.name,
            year: i32::try_from(row.year).or_raise(|| ErrorKind::InvalidData("year"))?,
            link: row.link,
            status: row.status.parse::<Status>().ok().ok_or_raise(|| ErrorKind::InvalidData("status"))?,
            date_updated: row
                .date_updated
                .map(|date| Date::parse(&date, DATE_FORMAT))
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("date updated"))?,
            rating: row.rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::Month;

    fn film(rating: Option<f64>) -> FilmRecord {
        FilmRecord {
            name: "Stalker".to_string(),
            year: 1979,
            link: "https://boxd.it/2bcA".to_string(),
            status: Status::Watched,
            date_updated: Some(Date::from_calendar_date(2021, Month::May, 1).unwrap()),
            rating,
        }
    }

    #[test]
    fn test_model_to_row() {
        let row = FilmRow::from_record(&film(Some(4.5)), 1_700_000_000).unwrap();
        assert_eq!(row.status, "watched");
        assert_eq!(row.date_updated.as_deref(), Some("2021-05-01"));
        assert_eq!(row.year, 1979);
        assert_eq!(row.synced_at, 1_700_000_000);
    }

    #[test]
    fn test_row_to_model() {
        let row = FilmRow {
            name: "Paris, Texas".to_string(),
            year: 1984,
            link: "https://boxd.it/29Wu".to_string(),
            status: "towatch".to_string(),
            date_updated: Some("2021-06-01".to_string()),
            rating: None,
            synced_at: 0,
        };
        let model = FilmRecord::try_from(row).unwrap();
        assert_eq!(model.status, Status::ToWatch);
        assert_eq!(model.date_updated, Some(Date::from_calendar_date(2021, Month::June, 1).unwrap()));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn test_non_finite_rating_is_invalid(#[case] rating: f64) {
        let err = FilmRow::from_record(&film(Some(rating)), 0).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("rating"));
    }

    #[test]
    fn test_unknown_status_is_invalid() {
        let row = FilmRow {
            name: "Heat".to_string(),
            year: 1995,
            link: "https://boxd.it/2a0Q".to_string(),
            status: "liked".to_string(),
            date_updated: None,
            rating: None,
            synced_at: 0,
        };
        let err = FilmRecord::try_from(row).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("status"));
    }
}
