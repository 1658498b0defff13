// src/scope/filter.rs
// =============================================================================
// The scope & trap filter: "should this URL ever be fetched?"
//
// Order of checks:
// 1. Parse and strip the fragment (unparseable -> reject)
// 2. Scheme must be http/https
// 3. Host must exist and sit under an allowed root domain
// 4. Host denylist (with its path/query narrowing)
// 5. Trap rule table
//
// The filter is immutable after construction, so one instance can be shared
// (via Arc or &) by every crawler worker without locks. Checking a URL never
// touches shared state: the same input always gives the same answer.
// =============================================================================

use super::normalize::normalize;
use super::policy::ScopePolicy;
use super::traps::{TrapKind, TrapTable, UrlParts};
use crate::config::ScopeConfig;
use crate::error::Result;
use std::fmt;
use tracing::debug;
use url::Url;

// Why a URL was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Unparseable,
    Scheme,
    MissingHost,
    OutOfScope,
    // Name of the deny rule that fired
    DeniedHost(String),
    Trap(TrapKind),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Unparseable => f.write_str("unparseable"),
            RejectReason::Scheme => f.write_str("scheme"),
            RejectReason::MissingHost => f.write_str("missing-host"),
            RejectReason::OutOfScope => f.write_str("out-of-scope"),
            RejectReason::DeniedHost(rule) => write!(f, "denied-host:{}", rule),
            RejectReason::Trap(kind) => write!(f, "trap:{}", kind),
        }
    }
}

// Outcome of checking one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(RejectReason),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }

    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            Verdict::Accept => None,
            Verdict::Reject(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScopeFilter {
    policy: ScopePolicy,
    traps: TrapTable,
}

impl ScopeFilter {
    pub fn new(policy: ScopePolicy, traps: TrapTable) -> Self {
        Self { policy, traps }
    }

    pub fn from_config(config: &ScopeConfig) -> Result<Self> {
        Ok(Self::new(
            ScopePolicy::from_config(config),
            TrapTable::new(&config.blocked_extensions)?,
        ))
    }

    // Should this URL be handed to the frontier?
    pub fn is_valid(&self, url: &str) -> bool {
        self.evaluate(url).is_accept()
    }

    // Accept, or reject with the first rule that fires
    pub fn evaluate(&self, url: &str) -> Verdict {
        match normalize(url) {
            Ok(parsed) => self.check_parsed(&parsed),
            Err(e) => {
                debug!(url, error = %e, "rejecting unparseable url");
                Verdict::Reject(RejectReason::Unparseable)
            }
        }
    }

    // Same as `evaluate` for an already parsed URL (the fragment is ignored)
    pub fn check_parsed(&self, url: &Url) -> Verdict {
        let parts = UrlParts::from_url(url);
        let verdict = match self.reasons(url, &parts).next() {
            Some(reason) => Verdict::Reject(reason),
            None => Verdict::Accept,
        };
        if let Verdict::Reject(reason) = &verdict {
            debug!(url = %url, %reason, "url rejected");
        }
        verdict
    }

    // Every rule the URL violates, without stopping at the first
    pub fn violations(&self, url: &str) -> Vec<RejectReason> {
        match normalize(url) {
            Ok(parsed) => {
                let parts = UrlParts::from_url(&parsed);
                self.reasons(&parsed, &parts).collect()
            }
            Err(_) => vec![RejectReason::Unparseable],
        }
    }

    // Lazy so that `evaluate` stops at the first hit and `violations` sees all
    fn reasons<'a>(
        &'a self,
        url: &'a Url,
        parts: &'a UrlParts,
    ) -> impl Iterator<Item = RejectReason> + 'a {
        let scheme = std::iter::once_with(move || {
            (!matches!(url.scheme(), "http" | "https")).then_some(RejectReason::Scheme)
        });
        let host = std::iter::once_with(move || {
            if parts.host.is_empty() {
                Some(RejectReason::MissingHost)
            } else if !self.policy.allows_host(&parts.host) {
                Some(RejectReason::OutOfScope)
            } else {
                None
            }
        });
        let denied = self
            .policy
            .denials(&parts.host, &parts.path, &parts.query)
            .map(|rule| RejectReason::DeniedHost(rule.to_string()));
        let traps = self.traps.matching(parts).map(RejectReason::Trap);

        scheme.chain(host).flatten().chain(denied).chain(traps)
    }
}
