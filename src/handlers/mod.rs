mod health;
mod message;
mod metrics;

pub use health::health_handler;
pub use message::message_handler;
pub use metrics::metrics_handler;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;

use crate::middleware::rate_limit_middleware;
use crate::state::AppState;

// only /message sits behind the rate limiter
pub fn router(state: Arc<AppState>) -> Router {
    let limited = Router::new()
        .route("/message", get(message_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware));

    Router::new()
        .merge(limited)
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
