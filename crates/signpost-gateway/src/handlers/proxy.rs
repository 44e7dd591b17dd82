use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::header::{HeaderName, CONNECTION, CONTENT_LENGTH, HOST};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Largest request body forwarded upstream.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

const FORWARDED_HOST: &str = "x-forwarded-host";

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Forwards a request the resolver let through to the upstream renderer.
pub async fn forward_handler(State(state): State<AppState>, request: Request) -> Result<Response> {
    let (parts, body) = request.into_parts();
    let url = state.upstream_url(parts.uri.path(), parts.uri.query());

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::InvalidUpstreamRequest(e.to_string()))?;

    let mut headers = parts.headers;
    strip_hop_by_hop(&mut headers);
    headers.remove(CONTENT_LENGTH);
    if let Some(host) = headers.remove(HOST) {
        headers
            .entry(HeaderName::from_static(FORWARDED_HOST))
            .or_insert(host);
    }

    debug!(method = %parts.method, upstream = %url, "forwarding request");

    let upstream = state
        .client()
        .request(parts.method, url)
        .headers(headers)
        .body(body)
        .send()
        .await?;

    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// Removes connection-scoped headers, including any the `Connection` header names.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value: &HeaderValue| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}
