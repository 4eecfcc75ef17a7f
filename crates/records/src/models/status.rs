use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Which list of the account a film came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// Logged in the diary.
    Watched,
    /// Sitting on the watchlist.
    ToWatch,
}
impl Status {
    /// Value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Watched => "watched",
            Status::ToWatch => "towatch",
        }
    }
}
impl FromStr for Status {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "watched" => Self::Watched,
            "towatch" => Self::ToWatch,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "status",
                value: s.to_string(),
            }),
        })
    }
}
impl TryFrom<String> for Status {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("watched", Status::Watched)]
    #[case("Watched", Status::Watched)]
    #[case("towatch", Status::ToWatch)]
    #[case("to-watch", Status::ToWatch)]
    #[case(" to_watch ", Status::ToWatch)]
    fn test_from_str(#[case] input: &str, #[case] expected: Status) {
        assert_eq!(input.parse::<Status>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("liked")]
    #[case("watchlist")]
    fn test_from_str_invalid(#[case] input: &str) {
        assert!(input.parse::<Status>().is_err());
    }

    #[test]
    fn test_display_matches_column_value() {
        assert_eq!(Status::Watched.to_string(), "watched");
        assert_eq!(Status::ToWatch.to_string(), "towatch");
    }
}
