//! # Offline Stub Backend
//!
//! An axum server that hosts the classification service routes and answers
//! them from the substitute generators, so a dashboard can be developed and
//! tested with no ML service running.
//!
//! ## Endpoints
//!
//! - `GET /` - liveness banner (`api is live`)
//! - `GET /health` - `HealthStatus`
//! - `GET /models` - offered models
//! - `GET /metrics` - evaluation summary
//! - `GET /features` - feature importance
//! - `POST /predict` - heuristic classification
//! - `GET /dataset` - paged substitute dataset
//! - `GET /shap/sample` - sample attributions
//! - `POST /predict-csv` - annotated CSV (multipart field `file`)
//!
//! Browser requests are accepted from loopback origins on any port.
//!
//! ## Configuration (Environment Variables)
//!
//! - `EXOAI_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod types;

pub use auth::get_api_key_from_env;
#[allow(unused_imports)]
pub use handlers::{
    dataset_handler, features_handler, health_handler, metrics_handler, models_handler,
    predict_csv_handler, predict_handler, root_handler, shap_sample_handler,
};
pub use types::{ErrorResponse, ROOT_BANNER};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use exoai_core::{DatasetRow, primitives::SUBSTITUTE_DATASET_ROWS, substitute};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Upload ceiling for `/predict-csv`.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    /// Reported as `last_ingest_timestamp` by `/health`.
    pub started_at: DateTime<Utc>,
    /// Dataset served by `/dataset`, generated once so paging is stable.
    pub rows: Arc<Vec<DatasetRow>>,
}

impl AppState {
    /// State with a dataset generated from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            started_at: Utc::now(),
            rows: Arc::new(substitute::dataset_rows(SUBSTITUTE_DATASET_ROWS, &mut rng)),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Whether `origin` is a browser page served from this machine.
///
/// Dashboard dev servers pick their own ports, so only the host is checked.
fn is_loopback_origin(origin: &HeaderValue) -> bool {
    let Ok(origin) = origin.to_str() else {
        return false;
    };
    let Some(authority) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };
    let host = match authority.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next().unwrap_or_default(),
        None => authority.split(':').next().unwrap_or_default(),
    };
    matches!(host, "localhost" | "127.0.0.1" | "::1")
}

/// CORS for a local dashboard: any loopback origin, the methods the routes use.
fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin, _| is_loopback_origin(origin)))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner): tracing, CORS, body limit,
/// authentication (if `EXOAI_API_KEY` is set).
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::info!("API key authentication disabled");
    }

    let mut router = Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/models", get(handlers::models_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/features", get(handlers::features_handler))
        .route("/predict", post(handlers::predict_handler))
        .route("/dataset", get(handlers::dataset_handler))
        .route("/shap/sample", get(handlers::shap_sample_handler))
        .route("/predict-csv", post(handlers::predict_csv_handler));

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve the stub on `addr` until Ctrl-C.
pub async fn run_server(addr: &str, state: AppState) -> std::io::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("ExoAI stub backend listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("shutting down stub backend"),
                Err(e) => {
                    tracing::warn!("cannot listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
}
