// src/scope/normalize.rs
// =============================================================================
// URL normalization.
//
// A crawler sees the same page under many spellings. The only difference we
// erase is the fragment ("page.html#section" -> "page.html"): the fragment is
// never sent to the server, so both spellings fetch the same document.
//
// Parsing through the `url` crate also gives us its canonical serialization
// (lowercase host, "/" for an empty path), so "http://WWW.ics.uci.edu" and
// "http://www.ics.uci.edu/#top" normalize to the same string.
// =============================================================================

use url::Url;

// Parses a URL and clears its fragment
pub fn normalize(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    url.set_fragment(None);
    Ok(url)
}

// Normalized string form of a URL, the unit of uniqueness
//
// Falls back to cutting at '#' when the URL does not parse, so even odd
// inputs collapse their fragment variants together.
pub fn normalize_str(raw: &str) -> String {
    match normalize(raw) {
        Ok(url) => url.to_string(),
        Err(_) => strip_fragment(raw.trim()).to_string(),
    }
}

// Cuts everything from the first '#'
pub fn strip_fragment(raw: &str) -> &str {
    match raw.split_once('#') {
        Some((before, _)) => before,
        None => raw,
    }
}
