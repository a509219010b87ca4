use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("foaas_requests_total", "Total number of message requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter = register_counter!(
        "foaas_rate_limited_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    // transport failures and non-200 answers only
    pub static ref UPSTREAM_ERRORS_TOTAL: Counter =
        register_counter!("foaas_upstream_errors_total", "Failed upstream calls").unwrap();
    pub static ref DECODE_ERRORS_TOTAL: Counter = register_counter!(
        "foaas_decode_errors_total",
        "Upstream payloads that could not be decoded"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "foaas_request_latency_seconds",
        "Message request latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_IDENTITIES: Gauge =
        register_gauge!("foaas_tracked_identities", "Identities held by the rate limiter").unwrap();
}
