// src/config.rs
// =============================================================================
// Static configuration for the crawler core.
//
// Everything here is read once at startup and never changes during a crawl.
// Every field has a default, so an empty (or absent) TOML file gives the
// stock UCI crawler. Scalars override one at a time; lists replace their
// default as a whole:
//
//   [quality]
//   min_word_count = 80          # other thresholds keep their defaults
//
//   [[scope.deny]]               # now the ONLY deny rule
//   name = "dataset-mirror"
//   host = "archive.ics.uci.edu"
// =============================================================================

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Number of words listed in the report (fixed, the artifact is top50_words.csv)
pub const TOP_WORDS: usize = 50;

// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    pub scope: ScopeConfig,
    pub quality: QualityConfig,
    pub analytics: AnalyticsConfig,
}

// Which URLs may ever be fetched
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    // Root domains; a host is in scope if it is one of these or a subdomain
    pub allowed_domains: Vec<String>,
    // Hosts (optionally narrowed to a path or query) that are never crawled
    pub deny: Vec<DenyRuleConfig>,
    // File extensions (without the dot) that never lead to a web page
    pub blocked_extensions: Vec<String>,
}

// One entry of the host denylist
//
// At most one of `host` / `host_contains` may be set. When `path_prefix`
// or `query_contains` are present the rule only fires for matching URLs on
// that host; the rest of the host stays crawlable. A rule without a host
// matcher applies to every allowed host and needs a path or query condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenyRuleConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_contains: Option<String>,
}

// Thresholds for the content quality gate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub min_content_bytes: usize,
    pub max_content_bytes: usize,
    pub min_word_count: usize,
}

// Analytics and report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub stopwords_path: PathBuf,
    pub min_token_length: usize,
    // Pages under this domain are counted per subdomain
    pub tracked_root_domain: String,
    pub output_dir: PathBuf,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            allowed_domains: ["ics.uci.edu", "cs.uci.edu", "informatics.uci.edu", "stat.uci.edu"]
                .into_iter()
                .map(String::from)
                .collect(),
            deny: default_deny_rules(),
            blocked_extensions: DEFAULT_BLOCKED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_content_bytes: 500,
            max_content_bytes: 5 * 1024 * 1024,
            min_word_count: 50,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            stopwords_path: PathBuf::from("stopwords.txt"),
            min_token_length: 4,
            tracked_root_domain: "uci.edu".to_string(),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl DenyRuleConfig {
    fn host(name: &str, host: &str) -> Self {
        Self {
            name: name.to_string(),
            host: Some(host.to_string()),
            host_contains: None,
            path_prefix: None,
            query_contains: None,
        }
    }

    fn host_containing(name: &str, fragment: &str) -> Self {
        Self {
            name: name.to_string(),
            host: None,
            host_contains: Some(fragment.to_string()),
            path_prefix: None,
            query_contains: None,
        }
    }
}

fn default_deny_rules() -> Vec<DenyRuleConfig> {
    vec![
        DenyRuleConfig::host("dataset-mirror", "archive.ics.uci.edu"),
        DenyRuleConfig::host_containing("grape-wiki", "grape.ics.uci.edu"),
        DenyRuleConfig::host_containing("gitlab", "gitlab"),
        DenyRuleConfig::host_containing("wordpress-login", "ngs.ics.uci.edu"),
        DenyRuleConfig {
            name: "photo-gallery".to_string(),
            host: None,
            host_contains: None,
            path_prefix: Some("/~eppstein/pix/".to_string()),
            query_contains: None,
        },
    ]
}

// Binary, media, archive and document formats
const DEFAULT_BLOCKED_EXTENSIONS: &[&str] = &[
    "css", "js", "bmp", "gif", "jpg", "jpeg", "ico", "png", "tif", "tiff", "mid", "mp2", "mp3",
    "mp4", "wav", "avi", "mov", "mpg", "mpeg", "ram", "m4v", "mkv", "ogg", "ogv", "pdf", "ps",
    "eps", "tex", "ppt", "pptx", "doc", "docx", "xls", "xlsx", "names", "data", "dat", "exe",
    "bz2", "tar", "msi", "bin", "7z", "psd", "dmg", "iso", "epub", "dll", "cnf", "tgz", "sha1",
    "thmx", "mso", "arff", "rtf", "jar", "csv", "rm", "smil", "wmv", "swf", "wma", "zip", "rar",
    "gz",
];

impl CrawlerConfig {
    // Loads and validates a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| CoreError::Config(format!("'{}': {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    // Collects every problem so the whole file can be fixed in one pass
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.scope.allowed_domains.is_empty() {
            errors.push("scope.allowed_domains must not be empty".to_string());
        }
        for domain in &self.scope.allowed_domains {
            if domain.trim().is_empty() || domain.starts_with('.') {
                errors.push(format!("scope.allowed_domains: invalid domain '{}'", domain));
            }
        }
        for rule in &self.scope.deny {
            match (&rule.host, &rule.host_contains) {
                (Some(_), Some(_)) => errors.push(format!(
                    "scope.deny '{}': set at most one of host / host_contains",
                    rule.name
                )),
                (None, None) if rule.path_prefix.is_none() && rule.query_contains.is_none() => {
                    errors.push(format!(
                        "scope.deny '{}': a rule without a host needs path_prefix or query_contains",
                        rule.name
                    ))
                }
                _ => {}
            }
        }
        for ext in &self.scope.blocked_extensions {
            if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                errors.push(format!("scope.blocked_extensions: invalid extension '{}'", ext));
            }
        }
        if self.quality.min_content_bytes >= self.quality.max_content_bytes {
            errors.push("quality.min_content_bytes must be below max_content_bytes".to_string());
        }
        if self.analytics.min_token_length == 0 {
            errors.push("analytics.min_token_length must be at least 1".to_string());
        }
        if self.analytics.tracked_root_domain.trim().is_empty() {
            errors.push("analytics.tracked_root_domain must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Config(errors.join("; ")))
        }
    }
}
