use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{forward_handler, health_handler};
use crate::middleware::resolve_request;
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        let edge = Router::new()
            .fallback(forward_handler)
            .layer(from_fn_with_state(state.clone(), resolve_request))
            .with_state(state);

        Router::new()
            .route("/healthz", get(health_handler))
            .fallback_service(edge)
            .layer(TraceLayer::new_for_http())
    }
}
