//! Output grouping for converted messages.
//!
//! Converted text is conventionally printed in blocks of five symbols,
//! the last block possibly shorter.

/// Conventional number of symbols per output group.
pub const GROUP_SIZE: usize = 5;

/// Inserts a single space after every `width` symbols of `text`.
///
/// A `width` of 0 leaves the text unchanged.
///
/// # Examples
///
/// ```
/// use enigmacrypt::utils::grouping::{group, GROUP_SIZE};
///
/// assert_eq!(group("QVPQSOKOILPUBKJZPISFXDW", GROUP_SIZE), "QVPQS OKOIL PUBKJ ZPISF XDW");
/// assert_eq!(group("ABCDE", GROUP_SIZE), "ABCDE");
/// ```
pub fn group(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + text.len() / width);
    for (i, c) in text.chars().enumerate() {
        if i > 0 && i % width == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
