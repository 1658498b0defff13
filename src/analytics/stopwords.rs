// src/analytics/stopwords.rs
// =============================================================================
// The stopword set: words too common to say anything about a page ("about",
// "which", "their"...). Loaded once from a plain text file, one word per line,
// and never modified afterwards.
//
// A missing file is not fatal. The crawl runs with an empty set and the
// report simply fills up with common English words.
// =============================================================================

use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    // Reads the word list at `path`, degrading to an empty set on failure
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let stopwords = Self::parse(&content);
                info!(
                    path = %path.display(),
                    count = stopwords.len(),
                    "loaded stopwords"
                );
                stopwords
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "stopword list unavailable, continuing without stopwords"
                );
                Self::default()
            }
        }
    }

    // One word per line; blank lines ignored, case folded
    pub fn parse(content: &str) -> Self {
        Self::from_words(content.lines())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
