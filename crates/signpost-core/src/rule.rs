use crate::path::PathCandidates;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;

/// What a matched rule asks the edge to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RedirectType {
    /// Permanent redirect.
    #[default]
    Permanent,
    /// Temporary redirect.
    Temporary,
    /// The resource was removed on purpose; answer with 410.
    Gone,
}

impl RedirectType {
    /// Parses the CMS string form of a redirect type.
    ///
    /// Anything other than `"302"` or `"410"` (including a missing value)
    /// is a permanent redirect, which is also the CMS default.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("302") => RedirectType::Temporary,
            Some("410") => RedirectType::Gone,
            _ => RedirectType::Permanent,
        }
    }

    /// The CMS string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectType::Permanent => "301",
            RedirectType::Temporary => "302",
            RedirectType::Gone => "410",
        }
    }
}

impl Display for RedirectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RedirectType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RedirectType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(Self::parse_lenient(value.as_deref()))
    }
}

/// A redirect rule as authored in the CMS.
///
/// Rules are created and edited outside of this system; the edge only ever
/// reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRule {
    /// The path being matched.
    pub source_path: String,
    /// Only honor an exact match on `source_path`.
    #[serde(default)]
    pub match_exact: bool,
    /// Inactive rules never match.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Destination, absolute or relative to the site origin.
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub redirect_type: RedirectType,
}

fn default_active() -> bool {
    true
}

impl RedirectRule {
    /// Returns true if this rule applies to a request with the given path candidates.
    pub fn matches(&self, candidates: &PathCandidates) -> bool {
        if !self.is_active {
            return false;
        }

        if self.match_exact {
            self.source_path == candidates.exact()
        } else {
            candidates.matches_loosely(&self.source_path)
        }
    }

    /// The projection a lookup hands back to the resolver.
    pub fn to_match(&self) -> RuleMatch {
        RuleMatch {
            target_url: self.target_url.clone(),
            redirect_type: self.redirect_type,
        }
    }
}

/// The part of a matched rule the resolver acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMatch {
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub redirect_type: RedirectType,
}

impl RuleMatch {
    /// The target URL, if present and not blank.
    pub fn target(&self) -> Option<&str> {
        self.target_url
            .as_deref()
            .map(str::trim)
            .filter(|target| !target.is_empty())
    }
}
