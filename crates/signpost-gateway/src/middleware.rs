use axum::extract::{Request, State};
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use signpost_resolver::gone::{GONE_CONTENT_TYPE, GONE_PAGE_HTML};
use signpost_resolver::resolution::{ROBOTS_HEADER, ROBOTS_NOINDEX};
use signpost_resolver::{RedirectStatus, RequestTarget, Resolution};
use tracing::warn;

use crate::state::AppState;

/// Resolves every request before it reaches the renderer.
pub async fn resolve_request(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let target = RequestTarget::new(
        request.uri().path(),
        request.uri().query().map(str::to_string),
        state.origin_for(request.headers(), request.uri()),
    );

    match state.resolver().resolve(&target).await {
        Resolution::Redirect { location, status } => match redirect(&location, status) {
            Some(response) => response,
            None => {
                warn!(request = %target, location = %location, "redirect location is not a valid header, passing through");
                next.run(request).await
            }
        },
        Resolution::Gone => gone(),
        Resolution::PassThrough { noindex } => {
            let mut response = next.run(request).await;
            if noindex {
                response.headers_mut().insert(
                    HeaderName::from_static(ROBOTS_HEADER),
                    HeaderValue::from_static(ROBOTS_NOINDEX),
                );
            }
            response
        }
    }
}

fn redirect(location: &str, status: RedirectStatus) -> Option<Response> {
    let location = HeaderValue::from_str(location).ok()?;
    let status = match status {
        RedirectStatus::MovedPermanently => StatusCode::MOVED_PERMANENTLY,
        RedirectStatus::Found => StatusCode::FOUND,
    };
    Some((status, [(LOCATION, location)]).into_response())
}

fn gone() -> Response {
    (
        StatusCode::GONE,
        [(CONTENT_TYPE, HeaderValue::from_static(GONE_CONTENT_TYPE))],
        GONE_PAGE_HTML,
    )
        .into_response()
}
