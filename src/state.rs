use std::sync::Arc;

use crate::rate_limit::RateLimiter;
use crate::service::MessageService;
use crate::validator::MessageValidator;

// app's shared state, built once in main and handed to the router

pub struct AppState {
    pub validator: Arc<dyn MessageValidator>,
    pub service: Arc<dyn MessageService>,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>, // None when rate limiting is disabled
}
