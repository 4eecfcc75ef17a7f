// Column names shared by the diary and watchlist exports.
pub(crate) const NAME: &str = "Name";
pub(crate) const YEAR: &str = "Year";
pub(crate) const LINK: &str = "Letterboxd URI";
pub(crate) const RATING: &str = "Rating";
// Only the diary has this one...
pub(crate) const WATCHED_DATE: &str = "Watched Date";
// ...and the watchlist only has this one (the diary's `Date` is when it was logged).
pub(crate) const DATE: &str = "Date";
