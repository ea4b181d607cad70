//! HTTP front end for fontconv.
//!
//! ```no_run
//! use fontconv_server::{ServerConfig, run};
//!
//! # async fn example() -> anyhow::Result<()> {
//! run(ServerConfig::default()).await
//! # }
//! ```

mod archive;
mod backend;
pub mod config;
mod error;
mod handlers;
pub mod naming;

use std::{future::Future, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header::CONTENT_DISPOSITION},
    routing::{get, post},
};
use log::info;
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::cors::{Any, CorsLayer};

pub use config::{Backend, ServerConfig};
pub use error::ApiError;

use crate::handlers::AppState;

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let state = AppState { backend: Arc::new(config.backend.clone()), options: config.options };

    Router::new()
        .route("/", get(handlers::root))
        .route("/convert", post(handlers::convert))
        .route("/api/convert", post(handlers::convert_batch))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors())
        .with_state(state)
}

/// Any origin, no credentials, `Content-Disposition` readable by browsers.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([CONTENT_DISPOSITION])
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("Listening on http://{addr} ({:?})", config.backend);

    axum::serve(listener, router(&config))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}

/// Bind `config.bind` and serve until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    serve(listener, config, async {
        if ctrl_c().await.is_ok() {
            info!("Shutting down");
        }
    })
    .await
}
