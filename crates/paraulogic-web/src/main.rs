use std::net::SocketAddr;
use std::time::Instant;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use paraulogic_core::WordIndex;
use paraulogic_web::config::MAX_PAGE_SIZE;
use paraulogic_web::rate_limit::RateLimiterLayer;
use paraulogic_web::{AppState, Config, router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load()?;
    info!(
        "dictionary {} (mode: {:?}), rate limit {} req/s burst {} keyed by {}{}",
        config.dictionary_path.display(),
        config.load_mode,
        config.rate_limit_rps,
        config.rate_limit_burst,
        config.rate_limit_header,
        if config.disable_cache { ", cache headers disabled" } else { "" }
    );

    let start = Instant::now();
    let index = WordIndex::build_from_file_with_mode(&config.dictionary_path, config.load_mode)?;
    info!(
        "index of {} words built in {} ms",
        index.len(),
        start.elapsed().as_millis()
    );

    let app = router(AppState {
        index,
        max_page_size: MAX_PAGE_SIZE,
        disable_cache: config.disable_cache,
    })
    .layer(RateLimiterLayer::new(
        config.rate_limit_rps,
        config.rate_limit_burst,
        config.rate_limit_header,
    ))
    .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_max_level(max_level)
        .init();
}
