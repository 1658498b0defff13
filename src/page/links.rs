// src/page/links.rs
// =============================================================================
// This module extracts outbound links from an accepted HTML page.
//
// We use the `scraper` crate to parse the page into a DOM and select every
// anchor with an href, and the `url` crate to resolve relative links against
// the page URL (the same way a browser does).
//
// What gets dropped before resolution:
// - empty hrefs and bare "#" markers
// - javascript:, mailto: and tel: links (not navigation)
// - the "#fragment" part of every link (same document)
//
// What gets dropped after resolution:
// - anything that is not http/https
//
// Nothing here decides whether a link is in scope; that is the filter's job.
// =============================================================================

use crate::scope::strip_fragment;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

// Schemes that never lead to another page
const NON_NAVIGATIONAL: &[&str] = &["javascript:", "mailto:", "tel:"];

// Extracts all absolute http(s) links from raw HTML bytes
//
// Parameters:
//   base_url: the URL the page was fetched from
//   html: the page body (decoded lossily as UTF-8)
//
// Returns: absolute URLs in document order, fragments removed
//
// Example:
//   html = "<a href='/docs#intro'>Docs</a>"
//   base_url = "https://www.ics.uci.edu/about/"
//   result = ["https://www.ics.uci.edu/docs"]
pub fn extract_links(base_url: &str, html: &[u8]) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => url,
        Err(e) => {
            warn!(base_url, error = %e, "cannot resolve links against invalid base url");
            return Vec::new();
        }
    };

    let selector = match Selector::parse("a[href], area[href]") {
        Ok(selector) => selector,
        Err(e) => {
            warn!(error = %e, "anchor selector failed to parse");
            return Vec::new();
        }
    };

    let html = String::from_utf8_lossy(html);
    let document = Html::parse_document(&html);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(&base, href))
        .collect()
}

// Turns one href into an absolute http(s) URL, or None if it should be skipped
//
// Examples (base = "https://www.ics.uci.edu/page"):
//   "/docs"              -> Some("https://www.ics.uci.edu/docs")
//   "../other#part"      -> Some("https://www.ics.uci.edu/other")
//   "#section"           -> None (same page)
//   "mailto:a@uci.edu"   -> None (not navigation)
//   "ftp://host/file"    -> None (not http)
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href == "#" {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if NON_NAVIGATIONAL
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let href = strip_fragment(href);
    if href.is_empty() {
        return None;
    }

    let url = match base.join(href) {
        Ok(url) => url,
        Err(e) => {
            debug!(href, error = %e, "skipping unresolvable link");
            return None;
        }
    };

    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why strip the fragment before joining?
//    - "page.html#a" and "page.html#b" are one document
//    - Stripping first means a bare "#section" becomes "" and is skipped,
//      instead of resolving to the current page again
//
// 2. Why String::from_utf8_lossy?
//    - Crawled pages lie about their encoding all the time
//    - Invalid bytes become U+FFFD; the rest of the page still parses
//
// 3. Why not return Result?
//    - html5ever recovers from any markup, so the only failure left is a bad
//      base URL, and a bad page should cost us that page, not the crawl
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.ics.uci.edu/about/";

    #[test]
    fn test_extract_absolute_link() {
        let html = br#"<a href="https://www.cs.uci.edu">CS</a>"#;
        assert_eq!(extract_links(BASE, html), vec!["https://www.cs.uci.edu/"]);
    }

    #[test]
    fn test_resolve_relative_links() {
        let html = br#"
            <a href="/docs">Docs</a>
            <a href="people.html">People</a>
            <a href="../research/">Research</a>
        "#;
        assert_eq!(
            extract_links(BASE, html),
            vec![
                "https://www.ics.uci.edu/docs",
                "https://www.ics.uci.edu/about/people.html",
                "https://www.ics.uci.edu/research/",
            ]
        );
    }

    #[test]
    fn test_fragments_stripped_and_bare_fragments_skipped() {
        let html = br##"
            <a href="/docs#install">Docs</a>
            <a href="#top">Top</a>
            <a href="#">Nothing</a>
        "##;
        assert_eq!(extract_links(BASE, html), vec!["https://www.ics.uci.edu/docs"]);
    }

    #[test]
    fn test_skip_non_navigational() {
        let html = br#"
            <a href="mailto:test@uci.edu">Email</a>
            <a href="tel:+19495551234">Call</a>
            <a href="JavaScript:void(0)">Menu</a>
            <a href="ftp://ftp.ics.uci.edu/pub/">FTP</a>
            <a href="   ">Blank</a>
        "#;
        assert!(extract_links(BASE, html).is_empty());
    }

    #[test]
    fn test_whitespace_trimmed() {
        let html = b"<a href=\"  /contact \n\">Contact</a>";
        assert_eq!(extract_links(BASE, html), vec!["https://www.ics.uci.edu/contact"]);
    }

    #[test]
    fn test_image_map_areas() {
        let html = br#"<map><area href="/floor/2" alt="Floor 2"></map>"#;
        assert_eq!(extract_links(BASE, html), vec!["https://www.ics.uci.edu/floor/2"]);
    }

    #[test]
    fn test_invalid_base_yields_nothing() {
        let html = br#"<a href="/docs">Docs</a>"#;
        assert!(extract_links("not a url", html).is_empty());
    }

    #[test]
    fn test_restartable() {
        let html = br#"<a href="/a">A</a><a href="/b">B</a>"#;
        assert_eq!(extract_links(BASE, html), extract_links(BASE, html));
    }
}
