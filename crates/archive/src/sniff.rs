/// Local file header; every archive with at least one entry starts with this.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// End of central directory record; an archive with zero entries is only this.
const ZIP_EMPTY_MAGIC: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
const UTF8_BOM: &str = "\u{feff}";

/// Detect a zip container from its magic bytes.
///
/// Returns `false` if the input is too short to contain a signature.
#[must_use]
pub fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC) || bytes.starts_with(&ZIP_EMPTY_MAGIC)
}

/// Decode entry bytes as UTF-8 text, replacing invalid sequences with U+FFFD
/// and dropping a leading byte order mark (spreadsheet exports love those).
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix(UTF8_BOM) {
        Some(stripped) => stripped.to_string(),
        None => text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00], true)]
    #[case(&[0x50, 0x4B, 0x05, 0x06], true)]
    #[case(&[0x50, 0x4B], false)]
    #[case(&[0x1F, 0x8B, 0x08], false)]
    #[case(b"Date,Name,Year", false)]
    #[case(&[], false)]
    fn test_is_zip(#[case] bytes: &[u8], #[case] expected: bool) {
        assert_eq!(is_zip(bytes), expected);
    }

    #[rstest]
    #[case(b"Name,Year", "Name,Year")]
    #[case(b"\xEF\xBB\xBFName,Year", "Name,Year")]
    #[case(b"Am\xC3\xA9lie", "Amélie")]
    #[case(b"broken \xFF byte", "broken \u{FFFD} byte")]
    fn test_decode_text(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(decode_text(bytes), expected);
    }
}
