//! HTTP edge in front of the page renderer.
//!
//! Every request except the health check runs through the resolver
//! middleware, which answers redirects and gone pages itself and forwards
//! everything else to the upstream renderer.

pub mod app;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod state;

pub use app::App;
pub use error::{AppError, Result};
pub use state::AppState;
