mod film;

pub(crate) use self::film::FilmRow;
