// src/scope/traps.rs
// =============================================================================
// The trap rule table.
//
// A "trap" is a URL space that never ends: calendars that link to next month
// forever, wiki pages with an ?action= variant per revision, relative links
// that stack /a/b/a/b/a/b/... Each rule here is a named predicate over the
// lowercase path and query of a URL. Rules are independent: any one of them
// rejects, and evaluation order never changes the outcome.
// =============================================================================

use crate::error::{CoreError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;

// Reason code for a trap rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapKind {
    // Binary/media/archive/document file
    BlockedExtension,
    // /dataset/ or /datasets/ download directories
    DatasetDirectory,
    // CMS/wiki action, listing sort, export or calendar query parameters
    QueryTrap,
    // /event/ and /events/ listings
    EventListing,
    // API, feed and WordPress internals
    DynamicEndpoint,
    // Same directory segment three or more times
    RepeatedSegment,
    // Dates and years in the path
    CalendarDate,
    // /page/<n>
    Pagination,
}

impl TrapKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrapKind::BlockedExtension => "blocked-extension",
            TrapKind::DatasetDirectory => "dataset-directory",
            TrapKind::QueryTrap => "query-trap",
            TrapKind::EventListing => "event-listing",
            TrapKind::DynamicEndpoint => "dynamic-endpoint",
            TrapKind::RepeatedSegment => "repeated-segment",
            TrapKind::CalendarDate => "calendar-date",
            TrapKind::Pagination => "pagination",
        }
    }
}

impl fmt::Display for TrapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The lowercase pieces of a URL the trap rules look at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlParts {
    pub host: String,
    pub path: String,
    pub query: String,
}

impl UrlParts {
    pub fn from_url(url: &url::Url) -> Self {
        Self {
            host: url.host_str().unwrap_or_default().to_lowercase(),
            path: url.path().to_lowercase(),
            query: url.query().unwrap_or_default().to_lowercase(),
        }
    }
}

// What a rule inspects
#[derive(Debug, Clone)]
pub enum TrapCheck {
    Path(Regex),
    Query(Regex),
    RepeatedSegment { min_repeats: usize },
}

#[derive(Debug, Clone)]
pub struct TrapRule {
    pub kind: TrapKind,
    pub check: TrapCheck,
}

impl TrapRule {
    pub fn matches(&self, parts: &UrlParts) -> bool {
        match &self.check {
            TrapCheck::Path(pattern) => pattern.is_match(&parts.path),
            TrapCheck::Query(pattern) => pattern.is_match(&parts.query),
            TrapCheck::RepeatedSegment { min_repeats } => {
                has_repeated_segment(&parts.path, *min_repeats)
            }
        }
    }
}

// Query parameter names that spawn endless variants of one logical page
const QUERY_TRAP_PARAMS: &[&str] = &[
    "action", "do", "export", "share", "type", "format", "rev", "rev2", "image", "diff",
    "oldid", "replytocom", "idx", "view", "expanded", "sort", "ical", "outlook-ical",
    "tribe-bar-date", "eventdate",
];

// The ordered rule table
#[derive(Debug, Clone)]
pub struct TrapTable {
    rules: Vec<TrapRule>,
}

impl TrapTable {
    // Builds the stock table with the given extension blocklist
    pub fn new(blocked_extensions: &[String]) -> Result<Self> {
        let mut rules = Vec::new();

        if !blocked_extensions.is_empty() {
            let alternatives = blocked_extensions
                .iter()
                .map(|ext| regex::escape(&ext.to_lowercase()))
                .collect::<Vec<_>>()
                .join("|");
            rules.push(path_rule(
                TrapKind::BlockedExtension,
                &format!(r"\.({})$", alternatives),
            )?);
        }

        rules.push(path_rule(TrapKind::DatasetDirectory, r"/datasets?/")?);

        let params = QUERY_TRAP_PARAMS
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        rules.push(TrapRule {
            kind: TrapKind::QueryTrap,
            check: TrapCheck::Query(compile(&format!(r"(^|&)({})=", params))?),
        });

        rules.push(path_rule(TrapKind::EventListing, r"/events?/")?);
        rules.push(path_rule(
            TrapKind::DynamicEndpoint,
            r"/(api|feed|rss|atom|xmlrpc|wp-json|wp-content|wp-includes)/",
        )?);
        rules.push(TrapRule {
            kind: TrapKind::RepeatedSegment,
            check: TrapCheck::RepeatedSegment { min_repeats: 3 },
        });

        // YYYY-MM[-DD] anywhere, a /19xx/ or /20xx/ year segment (optionally
        // with -MM), or a trailing MM-DD
        rules.push(path_rule(
            TrapKind::CalendarDate,
            r"\d{4}-\d{2}(-\d{2})?|/(19|20)\d{2}(-\d{2})?(/|$)|(^|/)\d{2}-\d{2}/?$",
        )?);
        rules.push(path_rule(TrapKind::Pagination, r"/page/\d+(/|$)")?);

        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[TrapRule] {
        &self.rules
    }

    // Kinds of every rule that fires, in table order
    pub fn matching<'a>(&'a self, parts: &'a UrlParts) -> impl Iterator<Item = TrapKind> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.matches(parts))
            .map(|rule| rule.kind)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| CoreError::Config(format!("bad trap pattern '{}': {}", pattern, e)))
}

fn path_rule(kind: TrapKind, pattern: &str) -> Result<TrapRule> {
    Ok(TrapRule {
        kind,
        check: TrapCheck::Path(compile(pattern)?),
    })
}

// Does any directory segment occur `min_repeats` or more times?
//
// Only directories count: the final segment of "/a/b/a/b/a/b" is the page
// itself, so "a" is a directory three times while "b" is only twice.
pub fn has_repeated_segment(path: &str, min_repeats: usize) -> bool {
    let mut segments: Vec<&str> = path.split('/').collect();
    // "/x/y" -> ["", "x", "y"]; drop the page name (or the "" after a trailing /)
    segments.pop();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    segments
        .into_iter()
        .filter(|segment| !segment.is_empty())
        .any(|segment| {
            let count = counts.entry(segment).or_insert(0);
            *count += 1;
            *count >= min_repeats
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScopeConfig;

    fn table() -> TrapTable {
        TrapTable::new(&ScopeConfig::default().blocked_extensions).unwrap()
    }

    fn parts(path: &str, query: &str) -> UrlParts {
        UrlParts {
            host: "www.ics.uci.edu".to_string(),
            path: path.to_string(),
            query: query.to_string(),
        }
    }

    fn kinds(path: &str, query: &str) -> Vec<TrapKind> {
        let table = table();
        let parts = parts(path, query);
        table.matching(&parts).collect()
    }

    #[test]
    fn test_stock_table_lists_each_kind_once() {
        let table = table();
        let kinds: Vec<TrapKind> = table.rules().iter().map(|rule| rule.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TrapKind::BlockedExtension,
                TrapKind::DatasetDirectory,
                TrapKind::QueryTrap,
                TrapKind::EventListing,
                TrapKind::DynamicEndpoint,
                TrapKind::RepeatedSegment,
                TrapKind::CalendarDate,
                TrapKind::Pagination,
            ]
        );
        // No extensions, no extension rule
        assert_eq!(TrapTable::new(&[]).unwrap().rules().len(), kinds.len() - 1);
    }

    #[test]
    fn test_clean_paths_pass() {
        assert!(kinds("/foo/bar", "").is_empty());
        assert!(kinds("/", "").is_empty());
        assert!(kinds("/~faculty/index.html", "id=3").is_empty());
        assert!(kinds("/courses/cs121/", "").is_empty());
    }

    #[test]
    fn test_extensions() {
        assert_eq!(kinds("/files/paper.pdf", ""), vec![TrapKind::BlockedExtension]);
        assert_eq!(kinds("/img/photo.jpeg", ""), vec![TrapKind::BlockedExtension]);
        assert_eq!(kinds("/x/archive.tar", ""), vec![TrapKind::BlockedExtension]);
        // Only a suffix counts
        assert!(kinds("/pdf/overview", "").is_empty());
    }

    #[test]
    fn test_extension_rule_is_configurable() {
        let table = TrapTable::new(&["bib".to_string()]).unwrap();
        let bib = parts("/papers/refs.bib", "");
        let pdf = parts("/papers/refs.pdf", "");
        assert_eq!(table.matching(&bib).count(), 1);
        assert_eq!(table.matching(&pdf).count(), 0);
    }

    #[test]
    fn test_dataset_directory() {
        assert_eq!(kinds("/ml/datasets/iris", ""), vec![TrapKind::DatasetDirectory]);
        assert_eq!(kinds("/dataset/", ""), vec![TrapKind::DatasetDirectory]);
    }

    #[test]
    fn test_query_traps() {
        assert_eq!(kinds("/wiki/page", "action=edit"), vec![TrapKind::QueryTrap]);
        assert_eq!(kinds("/wiki/page", "id=4&do=diff"), vec![TrapKind::QueryTrap]);
        assert_eq!(kinds("/files/", "c=n&sort=d"), vec![TrapKind::QueryTrap]);
        assert_eq!(kinds("/cal/", "ical=1"), vec![TrapKind::QueryTrap]);
        // Parameter names must match whole
        assert!(kinds("/search", "transaction=1").is_empty());
    }

    #[test]
    fn test_events_and_endpoints() {
        assert_eq!(kinds("/events/talk", ""), vec![TrapKind::EventListing]);
        assert_eq!(kinds("/wp-json/wp/v2", ""), vec![TrapKind::DynamicEndpoint]);
        assert_eq!(kinds("/blog/feed/", ""), vec![TrapKind::DynamicEndpoint]);
    }

    #[test]
    fn test_repeated_segments() {
        assert!(has_repeated_segment("/a/b/a/b/a/b", 3));
        assert!(has_repeated_segment("/x/x/x/", 3));
        assert!(!has_repeated_segment("/a/b/a/b", 3));
        // The page name itself is not a directory
        assert!(!has_repeated_segment("/a/a/a", 3));
        assert_eq!(kinds("/a/b/a/b/a/b", ""), vec![TrapKind::RepeatedSegment]);
    }

    #[test]
    fn test_calendar_dates() {
        assert_eq!(kinds("/calendar/2024-05", ""), vec![TrapKind::CalendarDate]);
        assert!(kinds("/news/2019-11-03/story", "").contains(&TrapKind::CalendarDate));
        assert_eq!(kinds("/seminars/2023/", ""), vec![TrapKind::CalendarDate]);
        assert_eq!(kinds("/seminars/1998", ""), vec![TrapKind::CalendarDate]);
        assert_eq!(kinds("/blog/05-14", ""), vec![TrapKind::CalendarDate]);
        // Numbers that are not years
        assert!(kinds("/rooms/3011/", "").is_empty());
        assert!(kinds("/cs/2100-lab", "").is_empty());
    }

    #[test]
    fn test_pagination() {
        assert_eq!(kinds("/news/page/7", ""), vec![TrapKind::Pagination]);
        assert_eq!(kinds("/news/page/12/", ""), vec![TrapKind::Pagination]);
        assert!(kinds("/news/page/about", "").is_empty());
    }

    #[test]
    fn test_rules_fire_independently() {
        // Several traps at once: each rule reports on its own
        let found = kinds("/events/2024-05/feed/", "action=ics");
        assert!(found.contains(&TrapKind::EventListing));
        assert!(found.contains(&TrapKind::CalendarDate));
        assert!(found.contains(&TrapKind::DynamicEndpoint));
        assert!(found.contains(&TrapKind::QueryTrap));
    }
}
