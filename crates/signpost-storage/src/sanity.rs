use crate::error::{Result, StorageError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use signpost_core::{LookupError, PathCandidates, RuleLookup, RuleMatch};
use std::time::Duration;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;
use url::Url;

pub const DEFAULT_API_VERSION: &str = "2025-07-13";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// GROQ query for the first active rule matching one of the three path spellings.
///
/// Exact-match rules compare against `$exactPath`; every other rule compares
/// against both slash variants.
pub const RULE_QUERY: &str = r#"*[_type == "redirects" && isActive == true && (
  (matchExact == true && sourcePath == $exactPath) ||
  (matchExact != true && (sourcePath == $path || sourcePath == $pathWithSlash))
)][0] { targetUrl, redirectType }"#;

/// Connection parameters for the CMS query API.
#[derive(Debug, Clone, TypedBuilder)]
pub struct SanityConfig {
    /// CMS project identifier. Lookups are skipped while it is unset.
    #[builder(default, setter(into))]
    pub project_id: Option<String>,
    /// Dataset name. Lookups are skipped while it is unset.
    #[builder(default, setter(into))]
    pub dataset: Option<String>,
    #[builder(default = DEFAULT_API_VERSION.to_string(), setter(into))]
    pub api_version: String,
    /// Bearer token for private datasets.
    #[builder(default, setter(into))]
    pub token: Option<String>,
    /// Query the edge-cached API host instead of the live one.
    #[builder(default = true)]
    pub use_cdn: bool,
    /// Per-request timeout of the HTTP client.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
    /// Replaces the `https://<project>.api(cdn).sanity.io` base URL.
    #[builder(default, setter(into))]
    pub endpoint: Option<String>,
}

impl SanityConfig {
    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref().filter(|v| !v.trim().is_empty())
    }

    fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// Returns true if both the project and the dataset are set.
    pub fn is_configured(&self) -> bool {
        self.project_id().is_some() && self.dataset().is_some()
    }

    /// The query endpoint, or `None` if the project or dataset is missing.
    pub fn query_endpoint(&self) -> Result<Option<Url>> {
        let (Some(project_id), Some(dataset)) = (self.project_id(), self.dataset()) else {
            return Ok(None);
        };

        let base = match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let host = if self.use_cdn { "apicdn" } else { "api" };
                format!("https://{}.{}.sanity.io", project_id, host)
            }
        };
        let version = self.api_version.trim_start_matches('v');

        let raw = format!("{}/v{}/data/query/{}", base, version, dataset);
        Url::parse(&raw)
            .map(Some)
            .map_err(|e| StorageError::InvalidEndpoint(format!("{}: {}", raw, e)))
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Option<RuleMatch>,
}

/// Rule lookup against the CMS HTTP query API.
///
/// Each call issues exactly one GET request; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct SanityRuleLookup {
    client: Client,
    endpoint: Option<Url>,
    token: Option<String>,
    timeout: Duration,
}

impl SanityRuleLookup {
    /// Creates a lookup with its own HTTP client.
    pub fn new(config: SanityConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("signpost/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StorageError::Client(e.to_string()))?;
        Self::with_client(config, client)
    }

    /// Creates a lookup sharing an existing HTTP client.
    ///
    /// `config.timeout` is applied to each request, overriding the client's own.
    pub fn with_client(config: SanityConfig, client: Client) -> Result<Self> {
        let endpoint = config.query_endpoint()?;
        if endpoint.is_none() {
            warn!("cms project or dataset not set, redirect lookups are disabled");
        }

        Ok(Self {
            client,
            endpoint,
            token: config.token.filter(|t| !t.is_empty()),
            timeout: config.timeout,
        })
    }

    /// Returns true if lookups will reach the CMS.
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    fn request_url(endpoint: &Url, candidates: &PathCandidates) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .append_pair("query", RULE_QUERY)
            .append_pair("$path", &quoted(candidates.without_slash()))
            .append_pair("$pathWithSlash", &quoted(candidates.with_slash()))
            .append_pair("$exactPath", &quoted(candidates.exact()));
        url
    }
}

/// Query parameters are passed as JSON string literals.
fn quoted(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn map_reqwest_error(err: reqwest::Error) -> LookupError {
    let message = err.to_string();

    if err.is_timeout() {
        LookupError::Timeout(message)
    } else if err.is_decode() || err.is_body() {
        LookupError::InvalidData(message)
    } else if let Some(status) = err.status() {
        LookupError::Status(status.as_u16())
    } else {
        LookupError::Unavailable(message)
    }
}

#[async_trait]
impl RuleLookup for SanityRuleLookup {
    async fn lookup(
        &self,
        candidates: &PathCandidates,
    ) -> signpost_core::Result<Option<RuleMatch>> {
        let Some(endpoint) = &self.endpoint else {
            trace!(path = %candidates, "cms lookup disabled");
            return Ok(None);
        };

        let url = Self::request_url(endpoint, candidates);
        trace!(path = %candidates, "querying cms for redirect rule");

        let mut request = self.client.get(url).timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: QueryResponse = response.json().await.map_err(map_reqwest_error)?;

        debug!(path = %candidates, found = body.result.is_some(), "cms lookup completed");
        Ok(body.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(use_cdn: bool, api_version: &str) -> SanityConfig {
        SanityConfig::builder()
            .project_id("abc123".to_string())
            .dataset("production".to_string())
            .api_version(api_version)
            .use_cdn(use_cdn)
            .build()
    }

    #[test]
    fn cdn_endpoint() {
        let url = config(true, DEFAULT_API_VERSION)
            .query_endpoint()
            .unwrap()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc123.apicdn.sanity.io/v2025-07-13/data/query/production"
        );
    }

    #[test]
    fn live_endpoint() {
        let url = config(false, DEFAULT_API_VERSION)
            .query_endpoint()
            .unwrap()
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc123.api.sanity.io/v2025-07-13/data/query/production"
        );
    }

    #[test]
    fn api_version_with_leading_v() {
        let url = config(true, "v2021-10-21")
            .query_endpoint()
            .unwrap()
            .unwrap();
        assert!(url.path().starts_with("/v2021-10-21/"));
    }

    #[test]
    fn missing_dataset_disables_lookup() {
        let cfg = SanityConfig::builder()
            .project_id("abc123".to_string())
            .build();
        assert!(!cfg.is_configured());
        assert!(cfg.query_endpoint().unwrap().is_none());
    }

    #[test]
    fn blank_project_disables_lookup() {
        let cfg = SanityConfig::builder()
            .project_id(" ".to_string())
            .dataset("production".to_string())
            .build();
        assert!(!cfg.is_configured());
    }

    #[test]
    fn request_carries_three_quoted_paths() {
        let endpoint = config(true, DEFAULT_API_VERSION)
            .query_endpoint()
            .unwrap()
            .unwrap();
        let url = SanityRuleLookup::request_url(&endpoint, &PathCandidates::new("/gh/offers/"));

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(pairs[0], ("query".to_string(), RULE_QUERY.to_string()));
        assert_eq!(pairs[1], ("$path".to_string(), "\"/gh/offers\"".to_string()));
        assert_eq!(
            pairs[2],
            ("$pathWithSlash".to_string(), "\"/gh/offers/\"".to_string())
        );
        assert_eq!(
            pairs[3],
            ("$exactPath".to_string(), "\"/gh/offers/\"".to_string())
        );
    }

    #[test]
    fn quoting_escapes_json() {
        assert_eq!(quoted(r#"/a"b"#), r#""/a\"b""#);
    }
}
