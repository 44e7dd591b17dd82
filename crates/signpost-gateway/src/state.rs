use std::sync::Arc;
use std::time::Duration;

use axum::http::header::HOST;
use axum::http::{HeaderMap, Uri};
use reqwest::redirect::Policy;
use reqwest::Client;
use signpost_resolver::Resolver;
use url::Url;

pub const FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const DEFAULT_SCHEME: &str = "http";

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<dyn Resolver>,
    client: Client,
    upstream: Url,
    public_origin: Option<String>,
}

impl AppState {
    pub fn new(resolver: Arc<dyn Resolver>, client: Client, upstream: Url) -> Self {
        Self {
            resolver,
            client,
            upstream,
            public_origin: None,
        }
    }

    /// Pins the origin used in redirect locations instead of deriving it per request.
    pub fn with_public_origin(mut self, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        self.public_origin = Some(origin.trim_end_matches('/').to_string());
        self
    }

    pub fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// `scheme://host` of the site as the client sees it.
    ///
    /// The host comes from `Host`, else from the request URI authority
    /// (HTTP/2 `:authority`). Empty when neither is present, which leaves
    /// redirect locations origin-relative.
    pub fn origin_for(&self, headers: &HeaderMap, uri: &Uri) -> String {
        if let Some(origin) = &self.public_origin {
            return origin.clone();
        }

        let host = match header_str(headers, HOST.as_str()) {
            Some(host) => host.to_string(),
            None => match uri.authority() {
                Some(authority) => match authority.port_u16() {
                    Some(port) => format!("{}:{}", authority.host(), port),
                    None => authority.host().to_string(),
                },
                None => return String::new(),
            },
        };
        let scheme = header_str(headers, FORWARDED_PROTO)
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|scheme| !scheme.is_empty())
            .or_else(|| uri.scheme_str())
            .unwrap_or(DEFAULT_SCHEME);

        format!("{}://{}", scheme, host)
    }

    /// The upstream URL for an inbound path and query.
    pub fn upstream_url(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.upstream.clone();
        let base = self.upstream.path().trim_end_matches('/');
        url.set_path(&format!("{}{}", base, path));
        url.set_query(query);
        url
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// HTTP client for the upstream renderer.
///
/// Redirects are handed back to the caller untouched.
pub fn upstream_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .redirect(Policy::none())
        .user_agent(concat!("signpost-gateway/", env!("CARGO_PKG_VERSION")))
        .build()
}
