//! File name normalization.
//!
//! A name is first transliterated to Latin script, then every character that
//! is not an ASCII letter, digit, underscore or period becomes an underscore.
//!
//! ```
//! use clean_folder::normalize::normalize;
//!
//! assert_eq!(normalize("фото.jpg"), "foto.jpg");
//! assert_eq!(normalize("my report (1).PDF"), "my_report__1_.PDF");
//! ```

use deunicode::deunicode_char;

/// Returns `true` for characters that survive normalization unchanged.
pub fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Maps a raw file name to a filesystem-safe one.
///
/// Characters with no Latin mapping are kept as-is by the transliteration
/// step and therefore end up as `_`. Distinct inputs may produce the same
/// output; callers decide what to do on collision.
pub fn normalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii() {
            out.push(sanitize(c));
            continue;
        }
        match deunicode_char(c) {
            Some(latin) if !latin.is_empty() => out.extend(latin.chars().map(sanitize)),
            _ => out.push('_'),
        }
    }
    out
}

fn sanitize(c: char) -> char {
    if is_safe_char(c) { c } else { '_' }
}
