// src/replay.rs
// =============================================================================
// Offline replay of fetched pages through the page pipeline.
//
// A manifest is a JSON Lines file, one fetched page per line:
//
//   {"url": "https://www.ics.uci.edu/about/", "status": 200,
//    "content_type": "text/html", "body_file": "pages/about.html"}
//
// `body` carries the page inline, `body_file` points at it on disk (relative
// to the manifest). Blank lines and lines starting with '#' are skipped.
//
// Pages run on tokio's blocking pool: HTML parsing is CPU work and must not
// stall the runtime that is also listening for signals.
// =============================================================================

use anyhow::{Context, Result};
use crawl_sentry::{FetchedResponse, PageProcessor};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    #[serde(default = "default_status")]
    pub status: u16,
    // Where the fetcher ended up after redirects
    #[serde(default)]
    pub final_url: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub body_file: Option<PathBuf>,
}

fn default_status() -> u16 {
    200
}

impl ManifestEntry {
    // Builds the response the pipeline sees; an unreadable body file
    // becomes an absent body, which the quality gate rejects
    fn to_response(&self, base_dir: &Path) -> FetchedResponse {
        let body = match (&self.body, &self.body_file) {
            (Some(inline), _) => Some(inline.clone().into_bytes()),
            (None, Some(file)) => {
                let path = base_dir.join(file);
                match std::fs::read(&path) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "could not read page body");
                        None
                    }
                }
            }
            (None, None) => None,
        };

        FetchedResponse {
            url: self.final_url.clone(),
            status: self.status,
            body,
            content_type: self.content_type.clone(),
        }
    }
}

// The outcome for one replayed page
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub url: String,
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub fn load_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest {}", path.display()))?;
    parse_manifest(&content).with_context(|| format!("invalid manifest {}", path.display()))
}

pub fn parse_manifest(content: &str) -> Result<Vec<ManifestEntry>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}", index + 1))
        })
        .collect()
}

// Runs every entry through `processor`, up to `workers` at a time
//
// Results arrive in completion order, not manifest order.
pub async fn replay(
    processor: Arc<PageProcessor>,
    entries: Vec<ManifestEntry>,
    base_dir: PathBuf,
    workers: usize,
) -> Vec<PageReport> {
    let base_dir = Arc::new(base_dir);

    stream::iter(entries)
        .map(|entry| {
            let processor = Arc::clone(&processor);
            let base_dir = Arc::clone(&base_dir);
            async move {
                let url = entry.url.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    let response = entry.to_response(&base_dir);
                    processor.process(&entry.url, &response)
                })
                .await;

                match outcome {
                    Ok(Ok(links)) => PageReport {
                        url,
                        links,
                        error: None,
                    },
                    Ok(Err(e)) => PageReport {
                        url,
                        links: Vec::new(),
                        error: Some(e.to_string()),
                    },
                    Err(e) => PageReport {
                        url,
                        links: Vec::new(),
                        error: Some(format!("worker failed: {}", e)),
                    },
                }
            }
        })
        .buffer_unordered(workers.max(1))
        .collect()
        .await
}
