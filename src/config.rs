use clap::{ArgAction, Parser};
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::DEFAULT_UPSTREAM_URL;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "foaas-gateway")]
#[command(about = "Rate limited proxy for the FOAAS message API")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "FOAAS_PORT", default_value_t = 4000)]
    pub port: u16,

    // Log level or tracing filter directive (e.g. "debug", "foaas_gateway=trace")
    #[arg(long, env = "FOAAS_LOG_LEVEL", default_value = "debug")]
    pub log_level: String,

    // Switch to enable the rate limiter
    #[arg(long, env = "FOAAS_RATE_LIMIT_ENABLE", default_value_t = true, action = ArgAction::Set)]
    pub rate_limit_enable: bool,

    // Max requests a user can do within the window
    #[arg(
        long,
        env = "FOAAS_RATE_LIMIT_COUNT",
        default_value_t = 5,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub rate_limit_count: u32,

    // Rate limit window in milliseconds
    #[arg(
        long = "rate-limit-window-in-milliseconds",
        env = "FOAAS_RATE_LIMIT_WINDOW_MS",
        default_value_t = 10000
    )]
    pub rate_limit_window_ms: u64,

    // Timeout of the upstream calls in milliseconds
    #[arg(long = "timeout-in-milliseconds", env = "FOAAS_TIMEOUT_MS", default_value_t = 10000)]
    pub timeout_ms: u64,

    // Upstream scheme + host
    #[arg(long, env = "FOAAS_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    pub upstream_url: String,

    // Attach the UserId header to upstream calls
    #[arg(long, env = "FOAAS_FORWARD_USER_ID", default_value_t = false, action = ArgAction::Set)]
    pub forward_user_id: bool,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    // Plain level ("debug") or filter directives ("info,hyper=warn").
    // Returns false alongside an info filter when log_level is unusable.
    pub fn log_filter(&self) -> (EnvFilter, bool) {
        let level = self.log_level.trim();
        if let Ok(filter) = level.parse::<LevelFilter>() {
            return (EnvFilter::default().add_directive(filter.into()), true);
        }
        // a lone word that is not a level is a typo, not a target name
        let is_directive = level.contains(['=', ',', '[', ':']);
        match EnvFilter::try_new(level) {
            Ok(filter) if is_directive => (filter, true),
            _ => (EnvFilter::new("info"), false),
        }
    }
}
