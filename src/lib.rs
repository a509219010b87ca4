pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod service;
pub mod state;
pub mod upstream;
pub mod validator;

use axum::http::HeaderMap;

// caller identity header
pub const USER_ID_HEADER: &str = "UserId";

pub const DEFAULT_UPSTREAM_URL: &str = "https://foaas.com";

// missing or non utf-8 header -> empty id, which validation rejects
pub fn user_id_from(headers: &HeaderMap) -> String {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
