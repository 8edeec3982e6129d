//! # Stub Endpoint Handlers
//!
//! Every handler answers from `exoai_core::substitute`, so responses have
//! exactly the shape of the live service.

use super::{
    AppState,
    types::{ErrorResponse, ROOT_BANNER},
};
use axum::{
    Json,
    extract::{Multipart, Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use exoai_core::{
    DatasetQuery, HealthStatus, PredictionRequest, dataset::apply_query, primitives::is_known_model,
    substitute,
};

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message)),
    )
        .into_response()
}

// =============================================================================
// ROOT / HEALTH
// =============================================================================

/// Liveness banner.
pub async fn root_handler() -> &'static str {
    ROOT_BANNER
}

/// Health check endpoint. The ingest timestamp is the server start time.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok".to_string(),
        last_ingest_timestamp: state.started_at,
    })
}

// =============================================================================
// MODEL CATALOG
// =============================================================================

pub async fn models_handler() -> impl IntoResponse {
    Json(substitute::models())
}

pub async fn metrics_handler() -> impl IntoResponse {
    Json(substitute::metrics())
}

pub async fn features_handler() -> impl IntoResponse {
    Json(substitute::feature_importance())
}

// =============================================================================
// PREDICTION
// =============================================================================

/// Classify one object with the heuristic.
pub async fn predict_handler(body: Result<Json<PredictionRequest>, JsonRejection>) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::JsonDataError(e))
            if e.body_text().contains("missing field `feature_values`") =>
        {
            return bad_request("Missing 'feature_values' field");
        }
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    if request.feature_values.is_empty() {
        return bad_request("Missing 'feature_values' field");
    }
    if !is_known_model(&request.model_id) {
        return bad_request(format!("Unknown model '{}'", request.model_id));
    }
    if let Some((name, _)) = request.feature_values.iter().find(|(_, v)| !v.is_finite()) {
        return bad_request(format!("Feature '{name}' must be finite"));
    }

    let result = substitute::prediction(&request, &mut rand::thread_rng());
    tracing::debug!(class = %result.predicted_class, model = %request.model_id, "stub prediction");
    (StatusCode::OK, Json(result)).into_response()
}

/// Annotate an uploaded CSV (multipart field `file`).
pub async fn predict_csv_handler(mut multipart: Multipart) -> Response {
    let upload = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => match field.bytes().await {
                Ok(bytes) => break bytes,
                Err(e) => return bad_request(format!("Unreadable upload: {e}")),
            },
            Ok(Some(_)) => continue,
            Ok(None) => return bad_request("Missing 'file' field"),
            Err(e) => return bad_request(format!("Invalid multipart body: {e}")),
        }
    };

    let Ok(text) = std::str::from_utf8(&upload) else {
        return bad_request("Upload is not UTF-8");
    };
    match exoai_core::csv::annotate_predictions(text) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(e) => bad_request(e.to_string()),
    }
}

// =============================================================================
// DATASET / SHAP
// =============================================================================

/// One page of the server's fixed substitute dataset.
pub async fn dataset_handler(
    State(state): State<AppState>,
    Query(query): Query<DatasetQuery>,
) -> impl IntoResponse {
    Json(apply_query(state.rows.as_ref().clone(), &query))
}

pub async fn shap_sample_handler() -> impl IntoResponse {
    Json(substitute::shap_samples(&mut rand::thread_rng()))
}
