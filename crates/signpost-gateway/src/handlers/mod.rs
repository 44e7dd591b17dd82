mod health;
mod proxy;

pub use health::health_handler;
pub use proxy::forward_handler;
