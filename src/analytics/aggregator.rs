// src/analytics/aggregator.rs
// =============================================================================
// The analytics aggregator: the only shared mutable state in the core.
//
// Every crawler worker calls `record` for each accepted page. We keep:
// - seen: every unique (fragment-free) URL, first writer wins
// - longest_page: the page with the most words, first to reach the max wins
// - word_frequency: word -> count across the corpus, stopwords excluded
// - subdomain_pages: host -> unique URLs, for hosts under the tracked domain
//
// One Mutex guards all of it. Tokenizing happens before we take the lock, so
// the critical section is just set lookups and counter merges.
//
// `flush` writes the report exactly once. The "already written" flag lives
// inside the same Mutex as the data, so checking and setting it is atomic
// with respect to every `record` and every other `flush`.
// =============================================================================

use super::report::{self, ReportPaths};
use super::stopwords::Stopwords;
use super::tokenize::tokens;
use crate::config::{AnalyticsConfig, TOP_WORDS};
use crate::error::Result;
use crate::scope::{is_same_or_subdomain, normalize, normalize_str};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

// The page with the most words so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LongestPage {
    pub url: String,
    pub word_count: usize,
}

// Read-only copy of the analytics, as reported
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsSnapshot {
    pub unique_pages: usize,
    pub longest_page: Option<LongestPage>,
    // Top words by count, ties in first-encountered order
    pub top_words: Vec<(String, u64)>,
    pub distinct_words: usize,
    // (host, unique pages), sorted by host
    pub subdomains: Vec<(String, usize)>,
    pub report_written: bool,
}

// What a call to `flush` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    Written(ReportPaths),
    AlreadyWritten,
}

#[derive(Debug, Clone, Copy)]
struct WordTally {
    count: u64,
    // Position of the word's first appearance in the corpus
    first_seen: u64,
}

#[derive(Debug, Default)]
struct AnalyticsState {
    seen: HashSet<String>,
    longest_page: Option<LongestPage>,
    word_frequency: HashMap<String, WordTally>,
    next_word_order: u64,
    subdomain_pages: BTreeMap<String, HashSet<String>>,
    report_written: bool,
}

impl AnalyticsState {
    fn snapshot(&self) -> AnalyticsSnapshot {
        let mut ranked: Vec<(&String, &WordTally)> = self.word_frequency.iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.first_seen.cmp(&b.first_seen))
        });

        AnalyticsSnapshot {
            unique_pages: self.seen.len(),
            longest_page: self.longest_page.clone(),
            top_words: ranked
                .into_iter()
                .take(TOP_WORDS)
                .map(|(word, tally)| (word.clone(), tally.count))
                .collect(),
            distinct_words: self.word_frequency.len(),
            subdomains: self
                .subdomain_pages
                .iter()
                .map(|(host, urls)| (host.clone(), urls.len()))
                .collect(),
            report_written: self.report_written,
        }
    }
}

// Everything `record` can compute before taking the lock
struct PageTally {
    url: String,
    host: Option<String>,
    word_count: usize,
    // Non-stopword counts in first-appearance order
    counts: Vec<(String, u64)>,
}

#[derive(Debug)]
pub struct Aggregator {
    state: Mutex<AnalyticsState>,
    stopwords: Arc<Stopwords>,
    min_token_length: usize,
    tracked_root_domain: String,
    output_dir: PathBuf,
}

impl Aggregator {
    pub fn new(config: &AnalyticsConfig, stopwords: Arc<Stopwords>) -> Self {
        Self {
            state: Mutex::new(AnalyticsState::default()),
            stopwords,
            min_token_length: config.min_token_length,
            tracked_root_domain: config.tracked_root_domain.trim().to_lowercase(),
            output_dir: config.output_dir.clone(),
        }
    }

    // Builds an aggregator, loading the stopword list named in the config
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        let stopwords = Stopwords::load(&config.stopwords_path);
        Self::new(config, Arc::new(stopwords))
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    // Records one accepted page
    //
    // Returns true if the page was new. A URL that was already recorded
    // (ignoring its fragment) contributes nothing, whatever its text.
    pub fn record(&self, url: &str, text: &str) -> bool {
        let page = self.tally(url, text);

        let mut state = self.lock();
        if !state.seen.insert(page.url.clone()) {
            debug!(url = %page.url, "page already recorded");
            return false;
        }

        if let Some(host) = page.host {
            state
                .subdomain_pages
                .entry(host)
                .or_default()
                .insert(page.url.clone());
        }

        let is_longer = state
            .longest_page
            .as_ref()
            .map_or(page.word_count > 0, |current| page.word_count > current.word_count);
        if is_longer {
            state.longest_page = Some(LongestPage {
                url: page.url,
                word_count: page.word_count,
            });
        }

        let AnalyticsState {
            word_frequency,
            next_word_order,
            ..
        } = &mut *state;
        for (word, count) in page.counts {
            let tally = word_frequency.entry(word).or_insert_with(|| {
                let first_seen = *next_word_order;
                *next_word_order += 1;
                WordTally {
                    count: 0,
                    first_seen,
                }
            });
            tally.count += count;
        }

        true
    }

    // Writes the report, once
    //
    // Only the first call across all threads writes; every later call
    // returns `AlreadyWritten`. The lock is held while writing, so the
    // report reflects a state no `record` is halfway through.
    pub fn flush(&self) -> Result<FlushOutcome> {
        let mut state = self.lock();
        if state.report_written {
            return Ok(FlushOutcome::AlreadyWritten);
        }
        // Set before writing: a failed write is not retried by a later trigger
        state.report_written = true;

        let snapshot = state.snapshot();
        match report::write_report(&self.output_dir, &snapshot) {
            Ok(paths) => {
                drop(state);
                info!(
                    unique_pages = snapshot.unique_pages,
                    subdomains = snapshot.subdomains.len(),
                    "analytics flushed"
                );
                report::print_summary(&snapshot);
                Ok(FlushOutcome::Written(paths))
            }
            Err(e) => {
                error!(error = %e, "failed to write crawl report");
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        self.lock().snapshot()
    }

    fn tally(&self, url: &str, text: &str) -> PageTally {
        let (url, host) = match normalize(url) {
            Ok(parsed) => {
                let host = parsed
                    .host_str()
                    .map(str::to_lowercase)
                    .filter(|host| is_same_or_subdomain(host, &self.tracked_root_domain));
                (parsed.to_string(), host)
            }
            Err(_) => (normalize_str(url), None),
        };

        let mut word_count = 0;
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<(String, u64)> = Vec::new();
        for token in tokens(text, self.min_token_length) {
            word_count += 1;
            if self.stopwords.contains(&token) {
                continue;
            }
            match index.get(&token) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(token.clone(), counts.len());
                    counts.push((token, 1));
                }
            }
        }

        PageTally {
            url,
            host,
            word_count,
            counts,
        }
    }

    // Every mutation leaves the state consistent, so a panic elsewhere while
    // holding the lock does not invalidate it
    fn lock(&self) -> MutexGuard<'_, AnalyticsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
