//! Farmix - Farcaster social compatibility service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - Neynar proxy endpoints                                   │
//! │  - Compatibility endpoint                                   │
//! │  - Health / metrics                                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Target lookup, concurrent graph fetch                    │
//! │  - Overlap scoring                                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Neynar Layer                             │
//! │  - Typed REST client                                        │
//! │  - Cursor pagination                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `service`: Compatibility analysis
//! - `neynar`: Upstream social graph client
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod neynar;
pub mod service;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Compatibility analysis over the upstream social graph
    pub analysis: Arc<service::AnalysisService>,

    /// Cancelled on shutdown; each request works under a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Build the shared HTTP client
    /// 2. Create the Neynar client
    /// 3. Wire the analysis service
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("Farmix/", env!("CARGO_PKG_VERSION")))
            .timeout(config.neynar.request_timeout())
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        let client = neynar::NeynarClient::new(&config.neynar, http_client)?;
        if !client.has_credentials() {
            tracing::warn!("Starting without a Neynar API key");
        }

        Ok(Self::with_graph(config, Arc::new(client)))
    }

    /// Build state around an existing social graph implementation
    pub fn with_graph(config: config::AppConfig, graph: Arc<dyn neynar::SocialGraph>) -> Self {
        let options = neynar::FetchOptions::from_config(&config.neynar);
        let analysis = service::AnalysisService::new(graph, options);

        tracing::info!("Application state initialized successfully");

        Self {
            config: Arc::new(config),
            analysis: Arc::new(analysis),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest(
            "/api",
            api::neynar_router().merge(api::compatibility_router()),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
        .merge(api::metrics_router())
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    let Some(allowed_origin) = server.allowed_origin.as_deref() else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(error) => {
            tracing::error!(
                %error,
                origin = %allowed_origin,
                "Failed to parse CORS origin; denying cross-origin requests"
            );
            CorsLayer::new().allow_methods(Any).allow_headers(Any)
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}
