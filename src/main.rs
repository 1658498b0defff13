// src/main.rs
// =============================================================================
// Entry point of the crawl-sentry CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing, stderr, filtered by -v or RUST_LOG)
// 3. Load the crawler configuration
// 4. Dispatch to the subcommand handler
// 5. Exit with a proper code (0 = success, 1 = rejected URLs or failed
//    pages, 2 = error, 130 = replay interrupted by a signal)
// =============================================================================

mod cli;
mod replay;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use crawl_sentry::config::CrawlerConfig;
use crawl_sentry::shutdown::{self, ShutdownHook, ShutdownTrigger};
use crawl_sentry::{PageProcessor, ScopeFilter};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => CrawlerConfig::load(path)?,
        None => CrawlerConfig::default(),
    };
    if let Some(output) = cli.output {
        config.analytics.output_dir = output;
    }

    match cli.command {
        Commands::Check { urls, all, json } => handle_check(&config, urls, all, json),
        Commands::Replay {
            manifest,
            json,
            workers,
        } => handle_replay(&config, &manifest, json, usize::from(workers)).await,
    }
}

// Logs go to stderr so --json output on stdout stays machine-readable
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crawl_sentry={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Serialize)]
struct CheckResult {
    url: String,
    valid: bool,
    reasons: Vec<String>,
}

// Handles the 'check' subcommand
fn handle_check(config: &CrawlerConfig, urls: Vec<String>, all: bool, json: bool) -> Result<i32> {
    let filter = ScopeFilter::from_config(&config.scope)?;

    let urls = if urls.is_empty() {
        read_stdin_urls()?
    } else {
        urls
    };

    let results: Vec<CheckResult> = urls
        .into_iter()
        .map(|url| {
            let reasons: Vec<String> = if all {
                filter.violations(&url).iter().map(|r| r.to_string()).collect()
            } else {
                filter
                    .evaluate(&url)
                    .reason()
                    .map(|r| r.to_string())
                    .into_iter()
                    .collect()
            };
            CheckResult {
                valid: reasons.is_empty(),
                url,
                reasons,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_check_table(&results);
    }

    let rejected = results.iter().filter(|r| !r.valid).count();
    Ok(if rejected > 0 { 1 } else { 0 })
}

fn read_stdin_urls() -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut urls = Vec::new();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read URLs from stdin")?;
        let line = line.trim();
        if !line.is_empty() {
            urls.push(line.to_string());
        }
    }
    Ok(urls)
}

fn print_check_table(results: &[CheckResult]) {
    println!("{:<60} {:<8} {}", "URL", "VALID", "REASON");
    println!("{}", "=".repeat(100));

    for result in results {
        println!(
            "{:<60} {:<8} {}",
            truncate(&result.url, 57),
            result.valid,
            result.reasons.join(", ")
        );
    }

    let accepted = results.iter().filter(|r| r.valid).count();
    println!();
    println!("Summary:");
    println!("   Accepted: {}", accepted);
    println!("   Rejected: {}", results.len() - accepted);
    println!("   Total: {}", results.len());
}

// Handles the 'replay' subcommand
//
// The replay races against Ctrl+C / SIGTERM. Whichever finishes first, the
// shutdown hook writes the report exactly once; if we return early with an
// error the hook's Drop still writes it.
async fn handle_replay(
    config: &CrawlerConfig,
    manifest: &Path,
    json: bool,
    workers: usize,
) -> Result<i32> {
    let entries = replay::load_manifest(manifest)?;
    let base_dir = manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let processor = Arc::new(PageProcessor::from_config(config)?);
    let hook = ShutdownHook::new(processor.aggregator());

    info!(pages = entries.len(), workers, "replaying manifest");

    let reports = tokio::select! {
        reports = replay::replay(Arc::clone(&processor), entries, base_dir, workers) => reports,
        trigger = shutdown::wait_for_signal() => {
            eprintln!("Received {}, writing report for pages processed so far", trigger);
            hook.trigger(trigger)?;
            return Ok(130);
        }
    };

    let aggregator = processor.aggregator();
    if hook.trigger(ShutdownTrigger::Completed)? {
        eprintln!("Report written to {}", aggregator.output_dir().display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_replay_table(&reports);
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    Ok(if failed > 0 { 1 } else { 0 })
}

fn print_replay_table(reports: &[replay::PageReport]) {
    println!("{:<60} {:<8} {}", "URL", "LINKS", "ERROR");
    println!("{}", "=".repeat(100));

    for report in reports {
        println!(
            "{:<60} {:<8} {}",
            truncate(&report.url, 57),
            report.links.len(),
            report.error.as_deref().unwrap_or("")
        );
    }

    let total_links: usize = reports.iter().map(|r| r.links.len()).sum();
    println!();
    println!("Summary:");
    println!("   Pages: {}", reports.len());
    println!("   Links to enqueue: {}", total_links);
}

// Truncates on a char boundary so non-ASCII URLs don't panic the table
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
