// src/page/text.rs
// =============================================================================
// Visible text extraction.
//
// A page's markup carries a lot of text nobody reads: inline scripts, CSS,
// navigation bars repeated on every page, form labels, embedded media.
// Counting those would make every page on a site look alike, so we drop
// those subtrees and keep the rest.
// =============================================================================

use scraper::Html;

// Elements whose whole subtree is not page content
const NON_CONTENT_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "meta", "link", "nav", "header",
    "footer", "form", "iframe", "object", "embed", "svg", "canvas", "video", "audio",
    "picture", "img",
];

// Visible text of a parsed document, text nodes joined by single spaces
pub fn visible_text(document: &Html) -> String {
    let mut text = String::new();

    for node in document.root_element().descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| NON_CONTENT_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(chunk);
    }

    text
}

// Decodes (lossily) and parses raw page bytes, then extracts visible text
pub fn visible_text_from_bytes(content: &[u8]) -> String {
    let html = String::from_utf8_lossy(content);
    visible_text(&Html::parse_document(&html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_scripts_and_styles() {
        let text = visible_text_from_bytes(
            br#"<html><head><title>T</title><style>p { color: red }</style></head>
            <body><script>var hidden = 1;</script><p>Hello <b>world</b></p></body></html>"#,
        );
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn test_strips_navigation_chrome() {
        let text = visible_text_from_bytes(
            br#"<body>
                <header>Site Header</header>
                <nav><a href="/">Home</a></nav>
                <main><p>Research statement</p></main>
                <form><label>Search</label></form>
                <footer>Copyright</footer>
            </body>"#,
        );
        assert_eq!(text, "Research statement");
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let text = visible_text_from_bytes(b"<p>caf\xff menu</p>");
        assert!(text.contains("menu"));
    }

    #[test]
    fn test_broken_html_still_yields_text() {
        let text = visible_text_from_bytes(b"<div><p>unclosed <span>tags everywhere");
        assert_eq!(text, "unclosed tags everywhere");
    }
}
