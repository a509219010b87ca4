use axum::{Json, extract::State, http::HeaderMap};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use crate::error::ApiError;
use crate::metrics::{DECODE_ERRORS_TOTAL, REQUEST_LATENCY, REQUEST_TOTAL, UPSTREAM_ERRORS_TOTAL};
use crate::models::Message;
use crate::service::ServiceError;
use crate::state::AppState;
use crate::user_id_from;

pub async fn message_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Message>, ApiError> {
    REQUEST_TOTAL.inc();
    let start_time = Instant::now();

    let user_id = user_id_from(&headers);
    if let Err(e) = state.validator.validate(&user_id) {
        error!(%user_id, "Error validating the message: {}", e);
        return Err(e.into());
    }

    let message = state.service.get_message(&user_id).await.map_err(|e| {
        match e {
            ServiceError::Upstream(_) => UPSTREAM_ERRORS_TOTAL.inc(),
            ServiceError::Decode(_) => DECODE_ERRORS_TOTAL.inc(),
        }
        error!(%user_id, "Error getting the message: {}", e);
        ApiError::from(e)
    })?;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());

    Ok(Json(message))
}
