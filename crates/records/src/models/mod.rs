mod film;
mod row;
mod status;

pub use self::film::{DATE_FORMAT, FilmRecord};
pub use self::row::RawRow;
pub use self::status::Status;
