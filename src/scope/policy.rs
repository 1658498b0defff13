// src/scope/policy.rs
// =============================================================================
// The scope policy: which hosts belong to the crawl at all.
//
// Two layers:
// 1. Allowed root domains. "ics.uci.edu" admits ics.uci.edu itself and every
//    subdomain (vision.ics.uci.edu, www.ics.uci.edu, ...). The match is on
//    whole labels, so "physics.uci.edu" is NOT under "ics.uci.edu".
// 2. Deny rules. Hosts inside the allowed space that are known traps (an
//    archive mirror, a login wall). A rule may be narrowed to a path prefix
//    or a query fragment, in which case the rest of the host stays crawlable.
//    A rule with no host part applies to its path on every allowed host.
// =============================================================================

use crate::config::{DenyRuleConfig, ScopeConfig};

// How a deny rule recognizes its host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMatch {
    // Every host; the rule is narrowed by path or query alone
    Any,
    Exact(String),
    Contains(String),
}

impl HostMatch {
    fn matches(&self, host: &str) -> bool {
        match self {
            HostMatch::Any => true,
            HostMatch::Exact(expected) => host == expected,
            HostMatch::Contains(fragment) => host.contains(fragment.as_str()),
        }
    }
}

// A host (optionally narrowed to part of the host) that is never crawled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenyRule {
    pub name: String,
    pub host: HostMatch,
    pub path_prefix: Option<String>,
    pub query_contains: Option<String>,
}

impl DenyRule {
    // Host first; the path/query conditions only matter under a matching host
    pub fn matches(&self, host: &str, path: &str, query: &str) -> bool {
        if !self.host.matches(host) {
            return false;
        }
        let path_hit = self
            .path_prefix
            .as_deref()
            .map_or(true, |prefix| path.starts_with(prefix));
        let query_hit = self
            .query_contains
            .as_deref()
            .map_or(true, |needle| query.contains(needle));
        path_hit && query_hit
    }
}

impl From<&DenyRuleConfig> for DenyRule {
    fn from(config: &DenyRuleConfig) -> Self {
        // Validation rejects setting both; host_contains wins if it happens
        let host = match (&config.host, &config.host_contains) {
            (_, Some(fragment)) => HostMatch::Contains(fragment.to_lowercase()),
            (Some(host), None) => HostMatch::Exact(host.to_lowercase()),
            (None, None) => HostMatch::Any,
        };
        Self {
            name: config.name.clone(),
            host,
            path_prefix: config.path_prefix.as_ref().map(|p| p.to_lowercase()),
            query_contains: config.query_contains.as_ref().map(|q| q.to_lowercase()),
        }
    }
}

// Allowed root domains plus the denylist
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    allowed_domains: Vec<String>,
    deny: Vec<DenyRule>,
}

impl ScopePolicy {
    pub fn new(allowed_domains: Vec<String>, deny: Vec<DenyRule>) -> Self {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.trim().to_lowercase())
                .collect(),
            deny,
        }
    }

    pub fn from_config(config: &ScopeConfig) -> Self {
        Self::new(
            config.allowed_domains.clone(),
            config.deny.iter().map(DenyRule::from).collect(),
        )
    }

    // True if `host` is an allowed root domain or one of its subdomains
    pub fn allows_host(&self, host: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|root| is_same_or_subdomain(host, root))
    }

    // Names of the deny rules that fire for this URL, in policy order
    pub fn denials<'a>(
        &'a self,
        host: &'a str,
        path: &'a str,
        query: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.deny
            .iter()
            .filter(move |rule| rule.matches(host, path, query))
            .map(|rule| rule.name.as_str())
    }
}

// "a.b.example.com" is under "example.com"; "badexample.com" is not
pub fn is_same_or_subdomain(host: &str, root: &str) -> bool {
    match host.strip_suffix(root) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_policy() -> ScopePolicy {
        ScopePolicy::from_config(&ScopeConfig::default())
    }

    #[test]
    fn test_subdomain_wildcard() {
        let policy = default_policy();
        assert!(policy.allows_host("ics.uci.edu"));
        assert!(policy.allows_host("vision.ics.uci.edu"));
        assert!(policy.allows_host("www.stat.uci.edu"));
        assert!(!policy.allows_host("uci.edu"));
        assert!(!policy.allows_host("google.com"));
    }

    #[test]
    fn test_label_boundary() {
        assert!(!is_same_or_subdomain("physics.uci.edu", "ics.uci.edu"));
        assert!(!is_same_or_subdomain("ics.uci.edu.evil.com", "ics.uci.edu"));
        assert!(is_same_or_subdomain("a.b.ics.uci.edu", "ics.uci.edu"));
    }

    #[test]
    fn test_exact_deny() {
        let policy = default_policy();
        let hits: Vec<_> = policy.denials("archive.ics.uci.edu", "/", "").collect();
        assert_eq!(hits, vec!["dataset-mirror"]);
        assert_eq!(policy.denials("www.ics.uci.edu", "/", "").count(), 0);
    }

    #[test]
    fn test_contains_deny() {
        let policy = default_policy();
        assert_eq!(
            policy.denials("gitlab.ics.uci.edu", "/", "").collect::<Vec<_>>(),
            vec!["gitlab"]
        );
        assert_eq!(
            policy.denials("ngs.ics.uci.edu", "/wp-login.php", "").collect::<Vec<_>>(),
            vec!["wordpress-login"]
        );
    }

    #[test]
    fn test_path_scoped_deny_only_hits_its_path() {
        let policy = default_policy();
        assert_eq!(
            policy
                .denials("www.ics.uci.edu", "/~eppstein/pix/chron/index.html", "")
                .collect::<Vec<_>>(),
            vec!["photo-gallery"]
        );
        assert_eq!(policy.denials("www.ics.uci.edu", "/~eppstein/", "").count(), 0);
        // The gallery is blocked on every host that serves it
        assert_eq!(
            policy
                .denials("ics.uci.edu", "/~eppstein/pix/chron/index.html", "")
                .collect::<Vec<_>>(),
            vec!["photo-gallery"]
        );
    }

    #[test]
    fn test_query_scoped_deny() {
        let rule = DenyRule {
            name: "session".to_string(),
            host: HostMatch::Exact("wics.ics.uci.edu".to_string()),
            path_prefix: None,
            query_contains: Some("share=".to_string()),
        };
        assert!(rule.matches("wics.ics.uci.edu", "/post", "share=twitter"));
        assert!(!rule.matches("wics.ics.uci.edu", "/post", ""));
        assert!(!rule.matches("www.ics.uci.edu", "/post", "share=twitter"));
    }
}
