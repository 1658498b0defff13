// src/page/quality.rs
// =============================================================================
// The content quality gate.
//
// Decides whether a fetched page is worth analyzing at all. Checks, in order:
// 1. There is a body
// 2. The declared content type is something we can read as a page
// 3. The body is neither tiny (error stubs, empty 200s) nor huge (binary
//    blobs served as 200 OK)
// 4. After stripping non-content markup, enough words remain
//
// A rejected page is a normal outcome, not an error. Rejected pages are also
// NOT mined for links.
// =============================================================================

use super::text::visible_text_from_bytes;
use crate::config::QualityConfig;
use std::fmt;

// Why the gate turned a page away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    Empty,
    UnsupportedContentType(String),
    TooSmall { bytes: usize },
    TooLarge { bytes: usize },
    TooFewWords { words: usize },
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateRejection::Empty => write!(f, "empty body"),
            GateRejection::UnsupportedContentType(ct) => write!(f, "content type '{}'", ct),
            GateRejection::TooSmall { bytes } => write!(f, "too small ({} bytes)", bytes),
            GateRejection::TooLarge { bytes } => write!(f, "too large ({} bytes)", bytes),
            GateRejection::TooFewWords { words } => write!(f, "too few words ({})", words),
        }
    }
}

// Result of running a page through the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assessment {
    Accepted { text: String, word_count: usize },
    Rejected(GateRejection),
}

impl Assessment {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Assessment::Accepted { .. })
    }

    // Visible text of an accepted page
    pub fn text(&self) -> Option<&str> {
        match self {
            Assessment::Accepted { text, .. } => Some(text.as_str()),
            Assessment::Rejected(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct QualityGate {
    min_bytes: usize,
    max_bytes: usize,
    min_words: usize,
}

impl QualityGate {
    pub fn new(config: &QualityConfig) -> Self {
        Self {
            min_bytes: config.min_content_bytes,
            max_bytes: config.max_content_bytes,
            min_words: config.min_word_count,
        }
    }

    pub fn evaluate(&self, content: Option<&[u8]>, content_type: Option<&str>) -> Assessment {
        let content = match content {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Assessment::Rejected(GateRejection::Empty),
        };

        if let Some(ct) = content_type {
            if !is_page_content_type(ct) {
                return Assessment::Rejected(GateRejection::UnsupportedContentType(
                    ct.to_string(),
                ));
            }
        }

        let bytes = content.len();
        if bytes < self.min_bytes {
            return Assessment::Rejected(GateRejection::TooSmall { bytes });
        }
        if bytes > self.max_bytes {
            return Assessment::Rejected(GateRejection::TooLarge { bytes });
        }

        let text = visible_text_from_bytes(content);
        let word_count = text.split_whitespace().count();
        if word_count < self.min_words {
            return Assessment::Rejected(GateRejection::TooFewWords { words: word_count });
        }

        Assessment::Accepted { text, word_count }
    }
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(&QualityConfig::default())
    }
}

// "text/html; charset=utf-8" -> "text/html"
fn is_page_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(
        mime.as_str(),
        "" | "text/html" | "application/xhtml+xml" | "text/plain"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_words(count: usize) -> String {
        let words: Vec<String> = (0..count).map(|i| format!("word{}", i)).collect();
        format!(
            "<html><head><title>Faculty</title></head><body><p>{}</p></body></html>",
            words.join(" ")
        )
    }

    #[test]
    fn test_short_page_rejected_by_size() {
        // About 200 bytes carrying 30 visible words
        let body = format!("<p>{}</p>", vec!["abcde"; 30].join(" "));
        assert!(body.len() < 200);

        let gate = QualityGate::default();
        let assessment = gate.evaluate(Some(body.as_bytes()), Some("text/html"));
        assert_eq!(
            assessment,
            Assessment::Rejected(GateRejection::TooSmall { bytes: body.len() })
        );
        assert!(!assessment.is_accepted());
        assert_eq!(assessment.text(), None);
    }

    #[test]
    fn test_rich_page_accepted() {
        let body = page_with_words(120);
        let gate = QualityGate::default();
        let assessment = gate.evaluate(Some(body.as_bytes()), Some("text/html; charset=UTF-8"));
        assert!(assessment.is_accepted());
        match assessment {
            Assessment::Accepted { text, word_count } => {
                // The <title> lives in <head> and is not counted
                assert_eq!(word_count, 120);
                assert!(text.starts_with("word0 word1"));
            }
            other => panic!("expected accepted page, got {:?}", other),
        }
    }

    #[test]
    fn test_script_heavy_page_has_too_few_words() {
        let script = "x".repeat(2000);
        let body = format!(
            "<html><body><script>{}</script><p>only a handful of real words</p></body></html>",
            script
        );
        let gate = QualityGate::default();
        assert_eq!(
            gate.evaluate(Some(body.as_bytes()), None),
            Assessment::Rejected(GateRejection::TooFewWords { words: 6 })
        );
    }

    #[test]
    fn test_oversized_body_rejected() {
        let gate = QualityGate::new(&QualityConfig {
            min_content_bytes: 10,
            max_content_bytes: 100,
            min_word_count: 1,
        });
        let body = page_with_words(50);
        assert!(matches!(
            gate.evaluate(Some(body.as_bytes()), None),
            Assessment::Rejected(GateRejection::TooLarge { .. })
        ));
    }

    #[test]
    fn test_missing_or_empty_body() {
        let gate = QualityGate::default();
        assert_eq!(
            gate.evaluate(None, Some("text/html")),
            Assessment::Rejected(GateRejection::Empty)
        );
        assert_eq!(
            gate.evaluate(Some(b""), None),
            Assessment::Rejected(GateRejection::Empty)
        );
    }

    #[test]
    fn test_binary_content_type_rejected() {
        let body = page_with_words(120);
        let gate = QualityGate::default();
        assert_eq!(
            gate.evaluate(Some(body.as_bytes()), Some("application/pdf")),
            Assessment::Rejected(GateRejection::UnsupportedContentType(
                "application/pdf".to_string()
            ))
        );
    }

    #[test]
    fn test_content_type_matching() {
        assert!(is_page_content_type("TEXT/HTML"));
        assert!(is_page_content_type("text/plain; charset=ascii"));
        assert!(is_page_content_type("application/xhtml+xml"));
        assert!(!is_page_content_type("image/png"));
    }
}
