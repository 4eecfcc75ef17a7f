use crate::error::{ErrorKind, Result};
use crate::models::RawRow;
use csv::ReaderBuilder;
use exn::ResultExt;
use tracing::instrument;

/// Parse CSV text with a header row into one [`RawRow`] per line.
///
/// Rows shorter than the header are accepted (the missing cells read as
/// absent). Cells beyond the last column name have nowhere to go and are
/// ignored; the rest of that row is kept. Only errors from the CSV reader
/// itself fail with [`ErrorKind::MalformedCsv`].
#[instrument(skip(text), fields(text_size = text.len(), rows))]
pub fn parse_rows(text: &str) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(text.as_bytes());
    let headers = reader.headers().or_raise(|| ErrorKind::MalformedCsv { line: 1 })?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                let line = err.position().map(|p| p.line()).unwrap_or_default();
                return Err(err).or_raise(|| ErrorKind::MalformedCsv { line });
            },
        };
        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            tracing::debug!(line, extra = record.len() - headers.len(), "Ignoring cells past the last column");
        }
        rows.push(headers.iter().zip(record.iter()).collect::<RawRow>());
    }
    tracing::Span::current().record("rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_defines_columns() {
        let rows = parse_rows(
            "Date,Name,Year,Letterboxd URI\n\
             2021-06-01,\"Paris, Texas\",1984,https://boxd.it/29Wu\n\
             2021-06-03,Heat,1995,https://boxd.it/2a0Q\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some("Paris, Texas"));
        assert_eq!(rows[1].get("Letterboxd URI"), Some("https://boxd.it/2a0Q"));
        assert_eq!(rows[1].get("Rating"), None);
    }

    #[test]
    fn test_short_rows_read_as_absent() {
        let rows = parse_rows("Name,Year,Letterboxd URI,Rating\nHeat,1995\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Year"), Some("1995"));
        assert_eq!(rows[0].get("Letterboxd URI"), None);
    }

    #[test]
    fn test_header_only_and_empty_text() {
        assert!(parse_rows("Date,Name,Year,Letterboxd URI\n").unwrap().is_empty());
        assert!(parse_rows("").unwrap().is_empty());
    }

    #[test]
    fn test_extra_cells_are_ignored() {
        let rows = parse_rows(
            "Date,Name,Year,Letterboxd URI\n\
             2021-05-02,Stalker,1979,https://boxd.it/2bcA\n\
             2021-06-02,Heat,1995,https://boxd.it/2a0Q,stray\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Name"), Some("Stalker"));
        assert_eq!(rows[1].get("Name"), Some("Heat"));
        assert_eq!(rows[1].get("Letterboxd URI"), Some("https://boxd.it/2a0Q"));
        assert_eq!(rows[1].len(), 4);
    }
}
