//! Text canonicalization for phrase matching.
//!
//! [`normalize`] lowercases, decomposes (NFKD), drops combining marks and
//! strips everything that is neither a word character nor whitespace, so
//! "Dolor  Abdominal," and "dolor  abdominal" compare equal and accented
//! Spanish text matches an unaccented lexicon.

use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

/// Canonical matching form of `text`. Total and idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .nfkd()
        .filter(|c| canonical_combining_class(*c) == 0)
        .collect();
    // Compatibility decomposition can surface uppercase letters (e.g. U+210C).
    stripped
        .to_lowercase()
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect()
}

/// [`normalize`] for optional input: absent text normalizes to `""`.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Word characters as understood by phrase boundaries: letters, digits, `_`.
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
