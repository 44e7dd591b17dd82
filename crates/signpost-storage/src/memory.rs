use crate::error::{Result, StorageError};
use async_trait::async_trait;
use dashmap::DashMap;
use signpost_core::{PathCandidates, RedirectRule, RuleLookup, RuleMatch};
use std::path::Path;
use tracing::trace;

/// In-memory rule table keyed by source path.
///
/// Follows the same matching rules as the CMS query: inactive rules never
/// match, exact rules only see the exact request path, loose rules see
/// either slash variant. When more than one rule applies, the exact
/// spelling wins over the slash-stripped one, which wins over the
/// slash-appended one. Documents sharing a source path are tried in
/// insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleLookup {
    rules: DashMap<String, Vec<RedirectRule>>,
}

impl InMemoryRuleLookup {
    /// Creates an empty rule table.
    pub fn new() -> Self {
        Self {
            rules: DashMap::new(),
        }
    }

    /// Creates a rule table from a list of rules.
    pub fn from_rules(rules: impl IntoIterator<Item = RedirectRule>) -> Self {
        let table = Self::new();
        for rule in rules {
            table.insert(rule);
        }
        table
    }

    /// Parses a JSON array of CMS redirect documents.
    pub fn from_json(json: &str) -> Result<Self> {
        let rules: Vec<RedirectRule> =
            serde_json::from_str(json).map_err(|e| StorageError::InvalidData(e.to_string()))?;
        Ok(Self::from_rules(rules))
    }

    /// Loads a JSON array of CMS redirect documents from disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Adds a rule after any existing rules for the same source path.
    pub fn insert(&self, rule: RedirectRule) {
        self.rules
            .entry(rule.source_path.clone())
            .or_default()
            .push(rule);
    }

    /// Removes every rule for a source path. Returns `true` if any existed.
    pub fn remove(&self, source_path: &str) -> bool {
        self.rules.remove(source_path).is_some()
    }

    /// Number of rule documents held, active or not.
    pub fn len(&self) -> usize {
        self.rules.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[async_trait]
impl RuleLookup for InMemoryRuleLookup {
    async fn lookup(&self, candidates: &PathCandidates) -> signpost_core::Result<Option<RuleMatch>> {
        let keys = [
            candidates.exact(),
            candidates.without_slash(),
            candidates.with_slash(),
        ];

        for key in keys {
            let Some(rules) = self.rules.get(key) else {
                continue;
            };
            if let Some(rule) = rules.iter().find(|rule| rule.matches(candidates)) {
                trace!(path = %candidates, source = %rule.source_path, "matched in-memory rule");
                return Ok(Some(rule.to_match()));
            }
        }

        Ok(None)
    }
}
