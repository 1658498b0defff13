// src/lib.rs
// =============================================================================
// The decision core of a focused crawler for the UCI academic web.
//
// The fetcher and the frontier live elsewhere; they call into this crate to
// answer three questions:
// - Should this URL ever be fetched? (scope)
// - Is this fetched page worth keeping? (page)
// - What does the crawl look like so far? (analytics)
//
// `pipeline::PageProcessor` strings the three together per fetched page and
// `shutdown::ShutdownHook` makes sure the report is written exactly once.
// =============================================================================

pub mod analytics;
pub mod config;
pub mod error;
pub mod page;
pub mod pipeline;
pub mod scope;
pub mod shutdown;

pub use analytics::{Aggregator, AnalyticsSnapshot, FlushOutcome, Stopwords};
pub use config::CrawlerConfig;
pub use error::{CoreError, Result};
pub use page::{extract_links, Assessment, QualityGate};
pub use pipeline::{FetchedResponse, PageProcessor};
pub use scope::{RejectReason, ScopeFilter, Verdict};
pub use shutdown::{ShutdownHook, ShutdownTrigger};
