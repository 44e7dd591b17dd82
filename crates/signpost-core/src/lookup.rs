use crate::error::Result;
use crate::path::PathCandidates;
use crate::rule::RuleMatch;
use async_trait::async_trait;

/// A read-only source of redirect rules.
///
/// Implementations answer a single question per request: which active rule,
/// if any, applies to this path. They hold no state between calls that the
/// resolver relies on.
#[async_trait]
pub trait RuleLookup: Send + Sync + 'static {
    /// Returns the first active rule matching the candidates.
    ///
    /// Rules with `matchExact` set are compared against
    /// [`PathCandidates::exact`]; all others against either slash variant.
    /// Returns `None` if no rule matches.
    async fn lookup(&self, candidates: &PathCandidates) -> Result<Option<RuleMatch>>;
}
