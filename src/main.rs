use clap::Parser; // for cli
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use foaas_gateway::config::Args;
use foaas_gateway::handlers::router;
use foaas_gateway::rate_limit::{RateLimiter, SlidingWindowLimiter};
use foaas_gateway::service::FoaasMessageService;
use foaas_gateway::state::AppState;
use foaas_gateway::upstream::HttpUpstreamClient;
use foaas_gateway::validator::UserIdValidator;

fn init_tracing(args: &Args) {
    let (filter, valid) = args.log_filter();

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if valid {
        info!("Setting log level: {}", args.log_level);
    } else {
        warn!("Error parsing the log level: {}, using info", args.log_level);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // parse cli arguments, exits non-zero on bad input
    let args = Args::parse();
    init_tracing(&args);

    let rate_limiter: Option<Arc<dyn RateLimiter>> = if args.rate_limit_enable {
        Some(Arc::new(SlidingWindowLimiter::new(
            args.rate_limit_count as usize,
            args.rate_window(),
        )))
    } else {
        None
    };

    let upstream = HttpUpstreamClient::new(args.upstream_url.clone(), args.timeout())?
        .forward_user_id(args.forward_user_id);

    let state = Arc::new(AppState {
        validator: Arc::new(UserIdValidator),
        service: Arc::new(FoaasMessageService::new(Arc::new(upstream))),
        rate_limiter,
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Gateway running on http://localhost:{}", args.port);
    info!("Forwarding to {} (timeout {} ms)", args.upstream_url, args.timeout_ms);
    if args.rate_limit_enable {
        info!(
            "Rate limit: {} requests per {} ms",
            args.rate_limit_count, args.rate_limit_window_ms
        );
    } else {
        info!("Rate limit disabled");
    }

    axum::serve(listener, app).await?;
    Ok(())
}
