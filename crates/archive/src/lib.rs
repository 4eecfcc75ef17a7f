//! Unpack a data export archive into named text payloads.
//!
//! The export is a zip container of CSV files. Callers look entries up by
//! their path inside the archive (e.g. `"diary.csv"`), so the order in which
//! entries were stored is not preserved.

pub mod error;
mod sniff;

use crate::error::{ErrorKind, Result};
pub use crate::sniff::is_zip;
use exn::ResultExt;
use std::collections::HashMap;
use std::collections::hash_map::{IntoIter, Iter};
use std::io::{Cursor, Read};
use tracing::instrument;
use zip::ZipArchive;

// Upper bound on the buffer reserved up front for one entry.
const MAX_PREALLOCATION: usize = 1 << 20;

/// Text content of every file in an export archive, keyed by entry path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportArchive {
    entries: HashMap<String, String>,
}
impl ExportArchive {
    /// Text content of the entry at `path`, if the archive contains it.
    pub fn get(&self, path: impl AsRef<str>) -> Option<&str> {
        self.entries.get(path.as_ref()).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.entries.iter()
    }
}
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ExportArchive {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}
impl IntoIterator for ExportArchive {
    type Item = (String, String);
    type IntoIter = IntoIter<String, String>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
impl<'a> IntoIterator for &'a ExportArchive {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Open `bytes` as a zip container and decode every file entry as text.
///
/// Directory entries are skipped. Entry content is decoded as UTF-8; invalid
/// byte sequences are replaced with U+FFFD rather than rejected.
#[instrument(skip(bytes), fields(archive_size = bytes.len(), entries))]
pub fn extract(bytes: &[u8]) -> Result<ExportArchive> {
    if !is_zip(bytes) {
        exn::bail!(ErrorKind::NotAnArchive);
    }
    let mut archive = ZipArchive::new(Cursor::new(bytes)).or_raise(|| ErrorKind::InvalidArchive)?;
    let mut entries = HashMap::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).or_raise(|| ErrorKind::InvalidArchive)?;
        if file.is_dir() {
            continue;
        }
        let path = file.name().to_string();
        let mut buffer = Vec::with_capacity(capacity_hint(file.size()));
        file.read_to_end(&mut buffer).or_raise(|| ErrorKind::Entry(path.clone()))?;
        tracing::trace!(path = %path, size = buffer.len(), "Archive entry decompressed");
        entries.insert(path, sniff::decode_text(&buffer));
    }
    tracing::Span::current().record("entries", entries.len());
    Ok(ExportArchive { entries })
}

/// Buffer to reserve for an entry that declares `size` uncompressed bytes.
/// The declaration comes from the archive itself, so it is only trusted up to
/// a point; `read_to_end` grows the buffer past that if the data is real.
fn capacity_hint(size: u64) -> usize {
    usize::try_from(size).unwrap_or(usize::MAX).min(MAX_PREALLOCATION)
}
