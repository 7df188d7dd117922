use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::get;
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::{Level, error, info};

mod metrics;

use younotes::cors::{CorsPolicy, DEFAULT_ALLOWED_ORIGINS};
use younotes::http::{AppState, router};
use younotes::sources::youtube::DEFAULT_BASE_URL;
use younotes::{Backoff, Opts, YouTubeCaptionSource};

#[derive(Parser, Debug)]
#[command(name = "younotes-server")]
#[command(about = "HTTP server for YouTube transcripts")]
struct Params {
    /// Host interface to bind to.
    #[arg(long = "host", default_value = "127.0.0.1")]
    host: String,

    /// TCP port to listen on.
    #[arg(long = "port", default_value_t = 8080)]
    port: u16,

    /// Browser origin allowed to call the API (repeatable).
    #[arg(long = "allow-origin", num_args = 1.., default_values_t = default_origins())]
    allowed_origins: Vec<String>,

    /// Total caption fetch attempts per request.
    #[arg(long = "attempts", default_value_t = 3)]
    attempts: u32,

    /// Per-attempt timeout in seconds.
    #[arg(long = "timeout-secs", default_value_t = 10)]
    timeout_secs: u64,

    /// Pause between attempts in milliseconds.
    #[arg(long = "retry-delay-ms", default_value_t = 1000)]
    retry_delay_ms: u64,

    /// Scale the retry pause by the attempt number instead of keeping it flat.
    #[arg(long = "linear-backoff", default_value_t = false)]
    linear_backoff: bool,

    /// Language tried when the requested one has no captions.
    #[arg(long = "fallback-lang", default_value = "en")]
    fallback_language: String,

    /// Base URL of the caption host.
    #[arg(long = "caption-base-url", default_value = DEFAULT_BASE_URL)]
    caption_base_url: String,

    /// Maximum request body size (bytes).
    #[arg(long = "max-bytes", default_value_t = 64 * 1024)]
    max_bytes: usize,
}

fn default_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect()
}

impl Params {
    fn opts(&self) -> Opts {
        Opts {
            max_attempts: self.attempts,
            attempt_timeout: Duration::from_secs(self.timeout_secs),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            backoff: if self.linear_backoff {
                Backoff::Linear
            } else {
                Backoff::Flat
            },
            fallback_language: self.fallback_language.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    younotes::init_logging();

    if let Err(err) = run().await {
        error!(error = ?err, "younotes-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let params = Params::parse();

    metrics::init();

    let addr: SocketAddr = format!("{}:{}", params.host, params.port)
        .parse()
        .context("invalid host/port bind address")?;

    let source = YouTubeCaptionSource::new()
        .context("failed to build caption source HTTP client")?
        .with_base_url(&params.caption_base_url);

    let cors = CorsPolicy::new(params.allowed_origins.iter().cloned());
    let opts = params.opts();
    info!(
        origins = ?cors.allowed_origins(),
        max_attempts = opts.max_attempts,
        timeout_secs = params.timeout_secs,
        "configured transcript service"
    );

    let app = router(AppState::new(source, opts), &cors)
        .route("/metrics", get(metrics::prometheus_metrics))
        .route_layer(from_fn(metrics::track_http_metrics))
        .layer(DefaultBodyLimit::max(params.max_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        );

    let listener = TcpListener::bind(addr).await.context("bind failed")?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = ?err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutting down");
}
