use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::config::ResolverConfig;
use crate::resolution::{RedirectStatus, Resolution};
use crate::resolver::Resolver;
use crate::target::RequestTarget;
use async_trait::async_trait;
use futures::FutureExt;
use signpost_core::{PathCandidates, RedirectType, RuleLookup, RuleMatch};
use tracing::{debug, error, trace, warn};

/// Service for resolving inbound requests at the edge.
///
/// Runs a fixed chain of checks, stopping at the first one that produces a
/// terminal answer:
///
/// 1. internal, static and file-like paths pass through untouched
/// 2. paths without a trailing slash get a 301 to the slashed path
/// 3. article pages pass through untouched
/// 4. the rule source is asked for a redirect or gone rule
/// 5. everything else passes through, offer detail pages marked `noindex`
///
/// Steps 1–3 never touch the rule source. A failed, slow or panicking
/// lookup counts as "no rule".
#[derive(Debug, Clone)]
pub struct ResolverService<L> {
    lookup: Arc<L>,
    config: Arc<ResolverConfig>,
}

impl<L: RuleLookup> ResolverService<L> {
    /// Creates a new ResolverService with the default path policy.
    pub fn new(lookup: L) -> Self {
        Self::with_config(lookup, ResolverConfig::default())
    }

    pub fn with_config(lookup: L, config: ResolverConfig) -> Self {
        Self {
            lookup: Arc::new(lookup),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Resolves a request target.
    ///
    /// # Returns
    ///
    /// * `PassThrough` - forward to the renderer, possibly with `noindex`
    /// * `Redirect` - answer with a 301 or 302
    /// * `Gone` - answer with the 410 page
    pub async fn resolve(&self, target: &RequestTarget) -> Resolution {
        Resolver::resolve(self, target).await
    }

    async fn decide(&self, target: &RequestTarget) -> Resolution {
        let path = target.path();

        if self.config.is_bypassed(path) {
            trace!(path = %path, "bypassed path");
            return Resolution::pass_through();
        }

        if !path.ends_with('/') {
            let location = target.with_trailing_slash();
            debug!(path = %path, location = %location, "adding trailing slash");
            return Resolution::Redirect {
                location,
                status: RedirectStatus::MovedPermanently,
            };
        }

        if self.config.is_article(path) {
            trace!(path = %path, "article path, skipping rule lookup");
            return Resolution::pass_through();
        }

        if let Some(rule) = self.find_rule(&PathCandidates::new(path)).await {
            if let Some(resolution) = self.apply(target, &rule) {
                debug!(
                    path = %path,
                    redirect_type = %rule.redirect_type,
                    status = ?resolution.status(),
                    location = ?resolution.location(),
                    "resolved by rule"
                );
                return resolution;
            }
            debug!(path = %path, "matched rule has no usable target");
        }

        let noindex = self.config.is_offer_detail(path);
        trace!(path = %path, noindex, "passing through");
        Resolution::PassThrough { noindex }
    }

    /// Asks the rule source for a rule, mapping every failure to `None`.
    async fn find_rule(&self, candidates: &PathCandidates) -> Option<RuleMatch> {
        let timeout = self.config.lookup_timeout;

        match tokio::time::timeout(timeout, self.lookup.lookup(candidates)).await {
            Ok(Ok(rule)) => rule,
            Ok(Err(e)) => {
                warn!(path = %candidates, error = %e, "redirect lookup failed, passing through");
                None
            }
            Err(_) => {
                warn!(
                    path = %candidates,
                    timeout_ms = timeout.as_millis() as u64,
                    "redirect lookup timed out, passing through"
                );
                None
            }
        }
    }

    fn apply(&self, target: &RequestTarget, rule: &RuleMatch) -> Option<Resolution> {
        if rule.redirect_type == RedirectType::Gone {
            return Some(Resolution::Gone);
        }

        let destination = rule.target()?;
        if self.config.is_gone_target(destination) {
            return Some(Resolution::Gone);
        }

        let status = match rule.redirect_type {
            RedirectType::Temporary => RedirectStatus::Found,
            _ => RedirectStatus::MovedPermanently,
        };

        Some(Resolution::Redirect {
            location: target.qualify(destination, self.config.canonicalize_targets),
            status,
        })
    }
}

#[async_trait]
impl<L: RuleLookup> Resolver for ResolverService<L> {
    async fn resolve(&self, target: &RequestTarget) -> Resolution {
        match AssertUnwindSafe(self.decide(target)).catch_unwind().await {
            Ok(resolution) => resolution,
            Err(_) => {
                error!(request = %target, "resolver panicked, passing through");
                Resolution::pass_through()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signpost_core::{LookupError, RedirectRule};
    use signpost_storage::InMemoryRuleLookup;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const ORIGIN: &str = "https://bets.example";

    /// Wraps a rule source and counts lookups.
    #[derive(Debug, Clone)]
    struct Counting<L> {
        inner: L,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl<L: RuleLookup> RuleLookup for Counting<L> {
        async fn lookup(
            &self,
            candidates: &PathCandidates,
        ) -> signpost_core::Result<Option<RuleMatch>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.lookup(candidates).await
        }
    }

    #[derive(Debug)]
    struct Failing(LookupError);

    #[async_trait]
    impl RuleLookup for Failing {
        async fn lookup(&self, _: &PathCandidates) -> signpost_core::Result<Option<RuleMatch>> {
            Err(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct Stalled;

    #[async_trait]
    impl RuleLookup for Stalled {
        async fn lookup(&self, _: &PathCandidates) -> signpost_core::Result<Option<RuleMatch>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }
    }

    #[derive(Debug)]
    struct Panicking;

    #[async_trait]
    impl RuleLookup for Panicking {
        async fn lookup(&self, _: &PathCandidates) -> signpost_core::Result<Option<RuleMatch>> {
            panic!("rule source bug");
        }
    }

    fn rule(source: &str, target: Option<&str>, redirect_type: RedirectType) -> RedirectRule {
        RedirectRule {
            source_path: source.to_string(),
            match_exact: false,
            is_active: true,
            target_url: target.map(str::to_string),
            redirect_type,
        }
    }

    fn service_with(
        rules: Vec<RedirectRule>,
    ) -> (ResolverService<Counting<InMemoryRuleLookup>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let lookup = Counting {
            inner: InMemoryRuleLookup::from_rules(rules),
            calls: calls.clone(),
        };
        (ResolverService::new(lookup), calls)
    }

    fn target(path: &str, query: Option<&str>) -> RequestTarget {
        RequestTarget::new(path, query.map(str::to_string), ORIGIN)
    }

    #[tokio::test]
    async fn reserved_paths_pass_through_without_lookup() {
        let (service, calls) = service_with(vec![rule("/api/x", Some("/y/"), RedirectType::Permanent)]);

        for path in [
            "/_next/static/chunk.js",
            "/api/x",
            "/static/img",
            "/studio",
            "/.well-known/assetlinks.json",
            "/410",
            "/robots.txt",
        ] {
            let result = service.resolve(&target(path, None)).await;
            assert_eq!(result, Resolution::pass_through(), "{path}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_trailing_slash_redirects_without_lookup() {
        let (service, calls) = service_with(vec![]);

        let result = service
            .resolve(&target("/gh/offers", Some("utm_source=news&x=%20")))
            .await;

        assert_eq!(
            result,
            Resolution::Redirect {
                location: "https://bets.example/gh/offers/?utm_source=news&x=%20".to_string(),
                status: RedirectStatus::MovedPermanently,
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn root_is_looked_up() {
        let (service, calls) = service_with(vec![]);

        let result = service.resolve(&target("/", None)).await;

        assert_eq!(result, Resolution::pass_through());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn article_pages_skip_lookup() {
        let (service, calls) = service_with(vec![rule(
            "/briefly/old-article/",
            Some("/briefly/new-article/"),
            RedirectType::Permanent,
        )]);

        let result = service.resolve(&target("/briefly/old-article/", None)).await;

        assert_eq!(result, Resolution::pass_through());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn article_index_is_looked_up() {
        let (service, calls) = service_with(vec![rule(
            "/briefly",
            Some("/news/"),
            RedirectType::Permanent,
        )]);

        let result = service.resolve(&target("/briefly/", None)).await;

        assert_eq!(result.location(), Some("https://bets.example/news/"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gone_rule_ignores_target() {
        let (service, _) = service_with(vec![rule(
            "/gh/old-offer",
            Some("/gh/new-offer/"),
            RedirectType::Gone,
        )]);

        let result = service.resolve(&target("/gh/old-offer/", None)).await;

        assert_eq!(result, Resolution::Gone);
        assert_eq!(result.location(), None);
    }

    #[tokio::test]
    async fn sentinel_target_means_gone() {
        let (service, _) = service_with(vec![rule(
            "/ng/expired-offer",
            Some("/410"),
            RedirectType::Permanent,
        )]);

        let result = service.resolve(&target("/ng/expired-offer/", None)).await;

        assert_eq!(result, Resolution::Gone);
    }

    #[tokio::test]
    async fn temporary_redirect_keeps_query() {
        let (service, _) = service_with(vec![rule(
            "/ng/promo",
            Some("/ng/summer-promo/"),
            RedirectType::Temporary,
        )]);

        let result = service.resolve(&target("/ng/promo/", Some("ref=tw"))).await;

        assert_eq!(
            result,
            Resolution::Redirect {
                location: "https://bets.example/ng/summer-promo/?ref=tw".to_string(),
                status: RedirectStatus::Found,
            }
        );
    }

    #[tokio::test]
    async fn absolute_target_is_used_verbatim() {
        let (service, _) = service_with(vec![rule(
            "/go/partner",
            Some("https://partner.example/landing?aff=7"),
            RedirectType::Permanent,
        )]);

        let result = service.resolve(&target("/go/partner/", Some("ref=1"))).await;

        assert_eq!(result.location(), Some("https://partner.example/landing?aff=7"));
        assert_eq!(result.status(), Some(301));
    }

    #[tokio::test]
    async fn rule_without_target_is_no_rule() {
        let (service, _) = service_with(vec![rule("/ng/offers/x", None, RedirectType::Permanent)]);

        let result = service.resolve(&target("/ng/offers/x/", None)).await;

        assert_eq!(result, Resolution::PassThrough { noindex: true });
    }

    #[tokio::test]
    async fn offer_detail_pages_are_noindexed() {
        let (service, _) = service_with(vec![]);

        assert_eq!(
            service.resolve(&target("/ng/offers/betika-welcome/", None)).await,
            Resolution::PassThrough { noindex: true }
        );
        assert_eq!(
            service.resolve(&target("/offers/", None)).await,
            Resolution::PassThrough { noindex: false }
        );
        assert_eq!(
            service.resolve(&target("/ng/welcome-offers/", None)).await,
            Resolution::PassThrough { noindex: false }
        );
    }

    #[tokio::test]
    async fn failing_lookup_passes_through() {
        for error in [
            LookupError::Unavailable("connection refused".to_string()),
            LookupError::Status(500),
            LookupError::InvalidData("expected value".to_string()),
            LookupError::Timeout("deadline".to_string()),
        ] {
            let service = ResolverService::new(Failing(error));
            let result = service.resolve(&target("/ng/offers/x/", None)).await;
            assert_eq!(result, Resolution::PassThrough { noindex: true });
        }
    }

    #[tokio::test]
    async fn stalled_lookup_is_bounded() {
        let config = ResolverConfig::builder()
            .lookup_timeout(Duration::from_millis(20))
            .build();
        let service = ResolverService::with_config(Stalled, config);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            service.resolve(&target("/gh/page/", None)),
        )
        .await
        .expect("resolver must not wait on a stalled lookup");

        assert_eq!(result, Resolution::pass_through());
    }

    #[tokio::test]
    async fn panicking_lookup_passes_through() {
        let service = ResolverService::new(Panicking);

        let result = service.resolve(&target("/gh/page/", None)).await;

        assert_eq!(result, Resolution::pass_through());
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let (service, calls) = service_with(vec![rule(
            "/ng/old-page",
            Some("/ng/new-page"),
            RedirectType::Permanent,
        )]);
        let t = target("/ng/old-page/", Some("a=1"));

        let first = service.resolve(&t).await;
        let second = service.resolve(&t).await;

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exact_rule_only_matches_exact_path() {
        let mut exact = rule("/gh/promos", Some("/gh/all-promos/"), RedirectType::Permanent);
        exact.match_exact = true;
        let (service, _) = service_with(vec![exact]);

        let result = service.resolve(&target("/gh/promos/", None)).await;

        assert_eq!(result, Resolution::pass_through());
    }

    #[tokio::test]
    async fn exact_rule_matches_its_own_spelling() {
        let mut exact = rule("/gh/promos/", Some("/gh/all-promos/"), RedirectType::Permanent);
        exact.match_exact = true;
        let (service, _) = service_with(vec![exact]);

        let result = service.resolve(&target("/gh/promos/", None)).await;

        assert_eq!(result.location(), Some("https://bets.example/gh/all-promos/"));
    }

    #[tokio::test]
    async fn unmatched_offers_index_is_noindexed() {
        let (service, _) = service_with(vec![]);

        let result = service.resolve(&target("/gh/offers/", None)).await;

        assert_eq!(result, Resolution::PassThrough { noindex: true });
    }

    mod scenarios {
        use super::*;

        #[tokio::test]
        async fn offers_index_without_slash() {
            let (service, _) = service_with(vec![]);
            let result = service.resolve(&target("/gh/offers", None)).await;
            assert_eq!(result.status(), Some(301));
            assert_eq!(result.location(), Some("https://bets.example/gh/offers/"));
        }

        #[tokio::test]
        async fn offers_index_gone() {
            let (service, _) =
                service_with(vec![rule("/gh/offers", None, RedirectType::Gone)]);
            let result = service.resolve(&target("/gh/offers/", None)).await;
            assert_eq!(result, Resolution::Gone);
            assert_eq!(result.location(), None);
        }

        #[tokio::test]
        async fn moved_page() {
            let (service, _) = service_with(vec![rule(
                "/ng/old-page",
                Some("/ng/new-page"),
                RedirectType::Permanent,
            )]);

            let plain = service.resolve(&target("/ng/old-page/", None)).await;
            assert_eq!(plain.status(), Some(301));
            assert_eq!(plain.location(), Some("https://bets.example/ng/new-page/"));

            let with_query = service.resolve(&target("/ng/old-page/", Some("s=1"))).await;
            assert_eq!(
                with_query.location(),
                Some("https://bets.example/ng/new-page/?s=1")
            );
        }

        #[tokio::test]
        async fn offer_detail_without_rule() {
            let (service, _) = service_with(vec![]);
            let result = service
                .resolve(&target("/ng/offers/betika-welcome/", None))
                .await;
            assert_eq!(result, Resolution::PassThrough { noindex: true });
        }

        #[tokio::test]
        async fn framework_asset() {
            let (service, calls) = service_with(vec![]);
            let result = service.resolve(&target("/_next/static/chunk.js", None)).await;
            assert_eq!(result, Resolution::pass_through());
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }
    }
}
