use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use autocomplete_index::TermIndex;
use autocomplete_server::{AppState, RateLimiterLayer, router};

const DEFAULT_RATE_LIMIT_RPS: u32 = 5;
const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

/// Serve weighted prefix autocomplete over HTTP.
#[derive(Debug, Clone, Parser)]
#[command(name = "autocomplete", version)]
struct Config {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    /// `weight<TAB>word` terms file to index at startup.
    #[arg(long = "terms", env = "TERMS_PATH", default_value = "terms.txt")]
    terms_path: PathBuf,
    /// Upper bound on `k` for /v1/matches.
    #[arg(long, env = "MAX_K", default_value_t = 500)]
    max_k: usize,
    #[arg(long = "no-cache", env = "DISABLE_CACHE")]
    disable_cache: bool,
    /// Requests per second per client; 0 keeps the default.
    #[arg(long, env = "RATE_LIMIT_RPS", default_value_t = DEFAULT_RATE_LIMIT_RPS)]
    rate_limit_rps: u32,
    #[arg(long, env = "RATE_LIMIT_BURST", default_value_t = DEFAULT_RATE_LIMIT_BURST)]
    rate_limit_burst: u32,
    /// Rate-limit on the last `X-Forwarded-For` hop instead of the peer address.
    #[arg(long, env = "TRUST_PROXY")]
    trust_proxy: bool,
}

impl Config {
    fn normalized(mut self) -> Self {
        if self.rate_limit_rps == 0 {
            self.rate_limit_rps = DEFAULT_RATE_LIMIT_RPS;
        }
        if self.rate_limit_burst == 0 {
            self.rate_limit_burst = DEFAULT_RATE_LIMIT_BURST;
        }
        self
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::parse().normalized();
    info!("binding to {}:{}", config.host, config.port);
    info!("using terms at {}", config.terms_path.display());
    if config.disable_cache {
        info!("cache headers disabled");
    }
    info!(
        "rate limit: {} req/s (burst {}), keyed on {}",
        config.rate_limit_rps,
        config.rate_limit_burst,
        if config.trust_proxy {
            "x-forwarded-for"
        } else {
            "peer address"
        }
    );

    let start = Instant::now();
    let index = TermIndex::build_from_file(&config.terms_path)
        .with_context(|| format!("loading terms from {}", config.terms_path.display()))?;
    info!("index built in {} ms", start.elapsed().as_millis());

    let state = AppState {
        index,
        max_k: config.max_k,
        disable_cache: config.disable_cache,
    };

    let rate_limiter = RateLimiterLayer::new(config.rate_limit_rps, config.rate_limit_burst)
        .trust_forwarded(config.trust_proxy);
    let app = router(state)
        .layer(rate_limiter)
        .layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
