//! `problemflow serve` -- HTTP JSON API for problem state transitions.
//!
//! Loads a seed file into a [`MemoryStore`] and exposes the transition
//! executor using `axum` + `tokio`.
//!
//! Security features:
//! - CORS headers on all responses (permissive for local dev)
//! - Per-IP rate limiting (default: 60 req/min, `PROBLEMFLOW_RATE_LIMIT`)
//! - Optional API key authentication via `PROBLEMFLOW_API_KEY`
//!
//! Endpoints:
//! - GET  /health                                         - Server status (exempt from auth)
//! - GET  /states                                         - Transition table
//! - POST /api/problem/{problem_number}/state/{new_state} - Transition a problem (also PUT, PATCH)
//!
//! All responses use Content-Type: application/json.

pub(crate) mod config;
mod error;
mod handlers;
mod middleware;
mod query;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Router};
use problemflow_engine::{Projector, TransitionExecutor};
use problemflow_storage::{MemoryStore, ProblemStore, SeedFile};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use self::config::ServeConfig;
pub(crate) use self::query::parse_field_list;
use self::handlers::{handle_health, handle_not_found, handle_states, handle_transition};
use self::middleware::{auth_middleware, rate_limit_middleware};
use self::state::{AppState, RateLimiter};

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default rate limit: 60 requests per minute per IP.
pub(crate) const DEFAULT_RATE_LIMIT: u64 = 60;

/// Rate limit window.
const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/states", get(handle_states))
        .route(
            "/api/problem/{problem_number}/state/{new_state}",
            post(handle_transition)
                .put(handle_transition)
                .patch(handle_transition),
        )
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server described by `config`.
///
/// When TLS cert/key paths are provided, the server listens over HTTPS
/// using `axum-server` with rustls. Otherwise it uses plain HTTP.
pub async fn start_server(config: ServeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let seed = SeedFile::from_path(&config.seed)?;
    let store = MemoryStore::from_seed(seed).await?;
    let loaded = store.list_numbers().await?.len();
    tracing::info!(seed = %config.seed.display(), problems = loaded, "loaded seed file");

    if config.api_key.is_some() {
        tracing::info!("API key authentication enabled");
    }
    tracing::info!(
        rate_limit = config.rate_limit,
        instance_url = %config.instance_url,
        "server configured"
    );

    let state = Arc::new(AppState {
        executor: TransitionExecutor::new(store, Projector::new(config.instance_url.clone())),
        rate_limiter: RateLimiter::new(config.rate_limit, RATE_LIMIT_WINDOW),
        api_key: config.api_key.clone(),
    });
    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);

    // TLS support via axum-server + rustls (requires `tls` feature)
    #[cfg(feature = "tls")]
    if let (Some(cert_path), Some(key_path)) = (&config.tls_cert, &config.tls_key) {
        let tls =
            axum_server::tls_rustls::RustlsConfig::from_pem_file(cert_path, key_path).await?;
        let socket_addr: std::net::SocketAddr = addr.parse()?;
        tracing::info!("problemflow listening on https://{}", addr);
        axum_server::bind_rustls(socket_addr, tls)
            .serve(app.into_make_service_with_connect_info::<std::net::SocketAddr>())
            .await?;
        return Ok(());
    }

    #[cfg(not(feature = "tls"))]
    if config.tls_cert.is_some() || config.tls_key.is_some() {
        tracing::warn!("TLS requested but this build lacks the `tls` feature; serving plain HTTP");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("problemflow listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
