// src/cli.rs
// =============================================================================
// Command-line interface, built with clap's derive API.
//
// Two subcommands drive the crawler core without any network access:
// - check: run URLs through the scope filter and explain each verdict
// - replay: feed already-fetched pages through the full page pipeline and
//   write the crawl report, exactly as a live crawl would
// =============================================================================

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "crawl-sentry",
    version,
    about = "Scope filtering, content gating and crawl analytics for the UCI academic web",
    long_about = "crawl-sentry is the decision core of a focused crawler. It decides which URLs \
                  are in scope, which fetched pages are worth keeping, and aggregates corpus \
                  statistics into a report under ./output/."
)]
pub struct Cli {
    /// Crawler configuration file (TOML); built-in defaults when omitted
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the report files are written to (overrides the config file)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// More log output: -v for info, -vv for debug (RUST_LOG wins when set)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether URLs would be crawled
    ///
    /// Example: crawl-sentry check https://www.ics.uci.edu/about
    /// With no URLs, one URL per line is read from stdin.
    Check {
        /// URLs to check
        urls: Vec<String>,

        /// List every rule a rejected URL breaks, not just the first
        #[arg(long)]
        all: bool,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Replay fetched pages from a JSON Lines manifest
    ///
    /// Each line is {"url", "status", "content_type", "body" | "body_file"};
    /// body_file paths are relative to the manifest.
    ///
    /// Example: crawl-sentry replay pages.jsonl --output ./output
    Replay {
        /// Path to the manifest
        manifest: PathBuf,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// How many pages are processed at once
        #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..))]
        workers: u16,
    },
}
