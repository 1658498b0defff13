// src/analytics/report.rs
// =============================================================================
// Rendering and writing the crawl report.
//
// Three files land in the output directory:
// - report_summary.txt: human-readable answers (unique pages, longest page,
//   top 50 words, subdomains)
// - top50_words.csv: "word,count"
// - subdomains.csv: "subdomain,count", hosts in lexicographic order
//
// Rendering is pure (snapshot in, String out); only `write_report` touches the
// filesystem.
// =============================================================================

use super::aggregator::AnalyticsSnapshot;
use crate::config::TOP_WORDS;
use crate::error::{CoreError, Result};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SUMMARY_FILE: &str = "report_summary.txt";
pub const TOP_WORDS_FILE: &str = "top50_words.csv";
pub const SUBDOMAINS_FILE: &str = "subdomains.csv";

// Where the three artifacts were written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub summary: PathBuf,
    pub top_words: PathBuf,
    pub subdomains: PathBuf,
}

pub fn render_summary(snapshot: &AnalyticsSnapshot) -> String {
    let rule = "=".repeat(60);
    let thin_rule = "-".repeat(40);
    let mut lines: Vec<String> = vec![
        rule.clone(),
        "WEB CRAWLER REPORT".to_string(),
        rule,
        String::new(),
        "1. NUMBER OF UNIQUE PAGES".to_string(),
        thin_rule.clone(),
        format!("Total unique pages: {}", snapshot.unique_pages),
        String::new(),
        "2. LONGEST PAGE BY WORD COUNT".to_string(),
        thin_rule.clone(),
    ];

    match &snapshot.longest_page {
        Some(page) => {
            lines.push(format!("URL: {}", page.url));
            lines.push(format!("Word count: {}", page.word_count));
        }
        None => {
            lines.push("URL: (none)".to_string());
            lines.push("Word count: 0".to_string());
        }
    }
    lines.push(String::new());

    lines.push(format!("3. TOP {} MOST COMMON WORDS", TOP_WORDS));
    lines.push(thin_rule.clone());
    lines.extend(
        snapshot
            .top_words
            .iter()
            .enumerate()
            .map(|(rank, (word, count))| format!("{}. {}: {}", rank + 1, word, count)),
    );
    lines.push(String::new());

    lines.push("4. SUBDOMAINS AND UNIQUE PAGE COUNTS".to_string());
    lines.push(thin_rule);
    lines.push(format!("Total subdomains found: {}", snapshot.subdomains.len()));
    lines.push(String::new());
    lines.extend(
        snapshot
            .subdomains
            .iter()
            .map(|(host, count)| format!("{}, {}", host, count)),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn render_top_words_csv(snapshot: &AnalyticsSnapshot) -> String {
    csv("word,count", &snapshot.top_words)
}

pub fn render_subdomains_csv(snapshot: &AnalyticsSnapshot) -> String {
    csv("subdomain,count", &snapshot.subdomains)
}

fn csv<N: std::fmt::Display>(header: &str, rows: &[(String, N)]) -> String {
    let mut out = format!("{}\n", header);
    for (key, count) in rows {
        out.push_str(&format!("{},{}\n", key, count));
    }
    out
}

// Writes all three artifacts into `dir`, creating it if needed
pub fn write_report(dir: &Path, snapshot: &AnalyticsSnapshot) -> Result<ReportPaths> {
    std::fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;

    let paths = ReportPaths {
        summary: dir.join(SUMMARY_FILE),
        top_words: dir.join(TOP_WORDS_FILE),
        subdomains: dir.join(SUBDOMAINS_FILE),
    };

    write_file(&paths.summary, &render_summary(snapshot))?;
    write_file(&paths.top_words, &render_top_words_csv(snapshot))?;
    write_file(&paths.subdomains, &render_subdomains_csv(snapshot))?;

    info!(dir = %dir.display(), "report written");
    Ok(paths)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| CoreError::io(path, e))
}

// End-of-crawl summary on stdout
pub fn print_summary(snapshot: &AnalyticsSnapshot) {
    println!("\n{}", "=".repeat(60));
    println!("CRAWLER ANALYTICS SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Unique pages crawled: {}", snapshot.unique_pages);
    match &snapshot.longest_page {
        Some(page) => println!("Longest page: {} ({} words)", page.url, page.word_count),
        None => println!("Longest page: (none)"),
    }
    println!("Unique words tracked: {}", snapshot.distinct_words);
    println!("Subdomains found: {}", snapshot.subdomains.len());
    println!("{}\n", "=".repeat(60));
}
