// src/scope/mod.rs
// =============================================================================
// Deciding which URLs the crawler may ever fetch.
//
// Submodules:
// - normalize: fragment stripping, the definition of "same URL"
// - policy: allowed root domains and the host denylist
// - traps: the trap rule table (calendars, repeated paths, CMS endpoints...)
// - filter: ScopeFilter, which ties the three together
// =============================================================================

mod filter;
mod normalize;
mod policy;
mod traps;

pub use filter::{RejectReason, ScopeFilter, Verdict};
pub use normalize::{normalize, normalize_str, strip_fragment};
pub use policy::{is_same_or_subdomain, DenyRule, HostMatch, ScopePolicy};
pub use traps::{has_repeated_segment, TrapCheck, TrapKind, TrapRule, TrapTable, UrlParts};
