// src/analytics/tokenize.rs
// =============================================================================
// Turns page text into words for the analytics.
//
// A word is a maximal run of ASCII letters, lowercased. Digits, punctuation
// and non-ASCII letters all act as separators, so "CS121's" gives "cs" and
// "s", and "e-mail" gives "e" and "mail". Short runs are dropped by length.
// =============================================================================

// Lazily yields the lowercase words of `text` with at least `min_len` letters
pub fn tokens(text: &str, min_len: usize) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(move |run| !run.is_empty() && run.len() >= min_len)
        .map(|run| run.to_ascii_lowercase())
}
