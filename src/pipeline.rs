// src/pipeline.rs
// =============================================================================
// The per-page entry point the crawler calls after every fetch.
//
// How it works:
// 1. Non-200 responses yield no links
// 2. The quality gate decides whether the page is worth anything
// 3. Accepted pages are recorded in the analytics
// 4. Their links are extracted, resolved, and passed through the scope filter
// 5. What survives goes back to the frontier
//
// A rejected page is neither recorded nor mined for links.
// =============================================================================

use crate::analytics::Aggregator;
use crate::config::CrawlerConfig;
use crate::error::{CoreError, Result};
use crate::page::{extract_links, Assessment, QualityGate};
use crate::scope::{normalize, ScopeFilter};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

// What the fetch layer hands us for one URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchedResponse {
    // Final URL after redirects, when the fetcher knows it
    pub url: Option<String>,
    pub status: u16,
    pub body: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

impl FetchedResponse {
    pub fn ok(body: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            url: None,
            status: 200,
            body: Some(body.into()),
            content_type: content_type.map(String::from),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageProcessor {
    filter: Arc<ScopeFilter>,
    gate: QualityGate,
    aggregator: Arc<Aggregator>,
}

impl PageProcessor {
    pub fn new(filter: Arc<ScopeFilter>, gate: QualityGate, aggregator: Arc<Aggregator>) -> Self {
        Self {
            filter,
            gate,
            aggregator,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(ScopeFilter::from_config(&config.scope)?),
            QualityGate::new(&config.quality),
            Arc::new(Aggregator::from_config(&config.analytics)),
        ))
    }

    pub fn aggregator(&self) -> Arc<Aggregator> {
        Arc::clone(&self.aggregator)
    }

    // Processes one fetched page and returns the links worth enqueuing
    //
    // `url` is the URL the fetcher was asked for. It came out of the
    // frontier, so it must parse; if it does not, the integration is broken
    // and the call fails with `CoreError::ContractViolation`.
    pub fn process(&self, url: &str, response: &FetchedResponse) -> Result<Vec<String>> {
        let page_url = normalize(url).map_err(|e| {
            CoreError::contract("process", format!("page url '{}' does not parse: {}", url, e))
        })?;

        if response.status != 200 {
            debug!(url = %page_url, status = response.status, "skipping non-200 response");
            return Ok(Vec::new());
        }

        let body = response.body.as_deref();
        let text = match self.gate.evaluate(body, response.content_type.as_deref()) {
            Assessment::Accepted { text, word_count } => {
                debug!(url = %page_url, word_count, "page accepted");
                text
            }
            Assessment::Rejected(reason) => {
                info!(url = %page_url, %reason, "page rejected by quality gate");
                return Ok(Vec::new());
            }
        };

        self.aggregator.record(page_url.as_str(), &text);

        // Relative links resolve against where the page actually lives
        let base = response.url.as_deref().unwrap_or(page_url.as_str());
        let links = extract_links(base, body.unwrap_or_default());
        let found = links.len();
        let valid: Vec<String> = links
            .into_iter()
            .filter(|link| self.filter.is_valid(link))
            .collect();

        debug!(url = %page_url, found, kept = valid.len(), "links filtered");
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::Stopwords;
    use crate::config::{AnalyticsConfig, QualityConfig, ScopeConfig};

    fn processor() -> PageProcessor {
        PageProcessor::new(
            Arc::new(ScopeFilter::from_config(&ScopeConfig::default()).unwrap()),
            QualityGate::new(&QualityConfig::default()),
            Arc::new(Aggregator::new(
                &AnalyticsConfig::default(),
                Arc::new(Stopwords::default()),
            )),
        )
    }

    fn rich_page(links: &str) -> Vec<u8> {
        let prose = "Faculty members study algorithms and systems. ".repeat(20);
        format!("<html><body><p>{}</p>{}</body></html>", prose, links).into_bytes()
    }

    #[test]
    fn test_accepted_page_is_recorded_and_links_filtered() {
        let processor = processor();
        let body = rich_page(
            r#"
            <a href="/people#faculty">People</a>
            <a href="http://google.com/">Google</a>
            <a href="/calendar/2024-05">Calendar</a>
            <a href="slides.pdf">Slides</a>
            <a href="http://vision.ics.uci.edu/">Vision</a>
            "#,
        );

        let links = processor
            .process(
                "http://www.ics.uci.edu/about/#top",
                &FetchedResponse::ok(body, Some("text/html")),
            )
            .unwrap();

        assert_eq!(
            links,
            vec!["http://www.ics.uci.edu/people", "http://vision.ics.uci.edu/"]
        );
        let snap = processor.aggregator().snapshot();
        assert_eq!(snap.unique_pages, 1);
        assert_eq!(snap.subdomains, vec![("www.ics.uci.edu".to_string(), 1)]);
    }

    #[test]
    fn test_thin_page_contributes_nothing() {
        let processor = processor();
        // ~200 bytes, 30 visible words, one link
        let words = vec!["word"; 30].join(" ");
        let body = format!(r#"<p>{}</p><a href="/next">next</a>"#, words);

        let links = processor
            .process(
                "http://www.ics.uci.edu/stub",
                &FetchedResponse::ok(body, Some("text/html")),
            )
            .unwrap();

        assert!(links.is_empty());
        let snap = processor.aggregator().snapshot();
        assert_eq!(snap.unique_pages, 0);
        assert!(snap.top_words.is_empty());
    }

    #[test]
    fn test_non_200_yields_nothing() {
        let processor = processor();
        let response = FetchedResponse {
            status: 404,
            ..FetchedResponse::ok(rich_page(r#"<a href="/x">x</a>"#), None)
        };
        assert!(processor
            .process("http://www.ics.uci.edu/missing", &response)
            .unwrap()
            .is_empty());
        assert_eq!(processor.aggregator().snapshot().unique_pages, 0);
    }

    #[test]
    fn test_redirect_target_is_the_base() {
        let processor = processor();
        let response = FetchedResponse {
            url: Some("http://www.cs.uci.edu/new/home.html".to_string()),
            ..FetchedResponse::ok(rich_page(r#"<a href="contact.html">Contact</a>"#), None)
        };
        let links = processor
            .process("http://www.cs.uci.edu/old", &response)
            .unwrap();
        assert_eq!(links, vec!["http://www.cs.uci.edu/new/contact.html"]);
    }

    #[test]
    fn test_response_deserializes_with_defaults() {
        let response: FetchedResponse =
            serde_json::from_str(r#"{"status": 200, "content_type": "text/html"}"#).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, None);
        assert_eq!(response.url, None);
    }

    #[test]
    fn test_unparseable_page_url_is_a_contract_violation() {
        let processor = processor();
        let result = processor.process("no scheme here", &FetchedResponse::ok(rich_page(""), None));
        assert!(matches!(result, Err(CoreError::ContractViolation { .. })));
    }
}
