// src/analytics/mod.rs
// =============================================================================
// Corpus-wide statistics for the crawl report.
//
// Submodules:
// - stopwords: the word list excluded from frequency counts
// - tokenize: text -> lowercase alphabetic words
// - aggregator: the thread-safe accumulator (record / flush / snapshot)
// - report: rendering and writing the three report files
// =============================================================================

mod aggregator;
mod report;
mod stopwords;
mod tokenize;

pub use aggregator::{Aggregator, AnalyticsSnapshot, FlushOutcome, LongestPage};
pub use report::{
    render_subdomains_csv, render_summary, render_top_words_csv, write_report, ReportPaths,
    SUBDOMAINS_FILE, SUMMARY_FILE, TOP_WORDS_FILE,
};
pub use stopwords::Stopwords;
pub use tokenize::tokens;
