use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::metrics::{RATE_LIMITED_TOTAL, TRACKED_IDENTITIES};
use crate::state::AppState;
use crate::user_id_from;

// 429 before the handler runs; no-op when rate limiting is disabled
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        let user_id = user_id_from(req.headers());
        let admitted = limiter.admit(&user_id);
        TRACKED_IDENTITIES.set(limiter.tracked_identities() as f64);

        if !admitted {
            RATE_LIMITED_TOTAL.inc();
            warn!(%user_id, "Too Many Requests");
            return ApiError::RateLimited.into_response();
        }
    }
    next.run(req).await
}
