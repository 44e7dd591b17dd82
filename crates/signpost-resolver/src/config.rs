use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_BYPASS_PREFIXES: [&str; 5] = ["/_next", "/api", "/static", "/studio", "/.well-known"];
pub const DEFAULT_GONE_PATH: &str = "/410";
pub const DEFAULT_ARTICLE_PREFIX: &str = "/briefly/";
pub const DEFAULT_OFFERS_MARKER: &str = "/offers/";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

fn default_bypass_prefixes() -> Vec<String> {
    DEFAULT_BYPASS_PREFIXES
        .iter()
        .map(|prefix| prefix.to_string())
        .collect()
}

/// Path policy and limits for [`ResolverService`](crate::ResolverService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ResolverConfig {
    /// Paths under these prefixes are never resolved.
    #[builder(default = default_bypass_prefixes())]
    pub bypass_prefixes: Vec<String>,
    /// The gone page itself. Also the sentinel that turns a redirect target
    /// into a 410.
    #[builder(default = DEFAULT_GONE_PATH.to_string(), setter(into))]
    pub gone_path: String,
    /// Section whose pages resolve themselves downstream; its index does not.
    #[builder(default = DEFAULT_ARTICLE_PREFIX.to_string(), setter(into))]
    pub article_prefix: String,
    /// Path fragment identifying offer pages.
    #[builder(default = DEFAULT_OFFERS_MARKER.to_string(), setter(into))]
    pub offers_marker: String,
    /// Upper bound on a single rule lookup.
    #[builder(default = DEFAULT_LOOKUP_TIMEOUT)]
    pub lookup_timeout: Duration,
    /// Give relative redirect targets a trailing slash so clients do not
    /// take a second hop through slash normalization.
    #[builder(default = true)]
    pub canonicalize_targets: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ResolverConfig {
    /// Internal, static and file-like paths.
    pub fn is_bypassed(&self, path: &str) -> bool {
        path == self.gone_path
            || path.contains('.')
            || self
                .bypass_prefixes
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Pages of the article section, excluding the section index.
    pub fn is_article(&self, path: &str) -> bool {
        path.starts_with(self.article_prefix.as_str()) && path != self.article_prefix
    }

    /// Offer detail pages: an offers path with at least two segments.
    pub fn is_offer_detail(&self, path: &str) -> bool {
        path.contains(self.offers_marker.as_str())
            && path.split('/').filter(|segment| !segment.is_empty()).count() >= 2
    }

    /// Redirect targets pointing at the gone page.
    pub fn is_gone_target(&self, target: &str) -> bool {
        let target = target.split(['?', '#']).next().unwrap_or(target);
        let target = target.strip_suffix('/').unwrap_or(target);
        target.ends_with(self.gone_path.as_str())
    }
}
