//! # Substitute Data
//!
//! Locally generated stand-ins for every service response. Each function
//! returns a complete value of the same type the live service produces, so a
//! consumer cannot tell the two apart by shape.
//!
//! - Health, models, metrics and feature importance are canned and
//!   deterministic.
//! - Dataset rows, SHAP samples and prediction attributions are drawn from
//!   the injected `Rng`; only their values vary between calls.

use crate::heuristic::{self, TransitSignal};
use crate::primitives::{
    CLASS_ORDER, FEATURES, MISSION_CYCLE, MODELS, SUBSTITUTE_DATASET_ROWS,
    SUBSTITUTE_SHAP_SAMPLES,
};
use crate::types::{
    DatasetPage, DatasetQuery, DatasetRow, FeatureImportance, HealthStatus, Metrics,
    MetricsSummary, ModelDescriptor, PredictionRequest, PredictionResult, ShapContribution,
    ShapSample,
};
use chrono::DateTime;
use rand::Rng;
use std::collections::BTreeMap;

/// Status reported by the health substitute.
pub const OFFLINE_STATUS: &str = "offline";

/// Timestamp of the snapshot the canned records describe (2025-10-04T00:00:00Z).
const SNAPSHOT_EPOCH_SECS: i64 = 1_759_536_000;

/// Half-width of the pseudo-random SHAP contribution interval.
const SHAP_SPREAD: f64 = 0.3;

// =============================================================================
// CANNED RECORDS
// =============================================================================

/// Health record for an unreachable service.
#[must_use]
pub fn health() -> HealthStatus {
    HealthStatus {
        status: OFFLINE_STATUS.to_string(),
        last_ingest_timestamp: DateTime::from_timestamp(SNAPSHOT_EPOCH_SECS, 0).unwrap_or_default(),
    }
}

/// Scores of each offered model, in `MODELS` order.
const MODEL_METRICS: [Metrics; 5] = [
    Metrics {
        accuracy: 0.85,
        precision: 0.84,
        recall: 0.83,
        f1: 0.835,
    },
    Metrics {
        accuracy: 0.82,
        precision: 0.81,
        recall: 0.80,
        f1: 0.805,
    },
    Metrics {
        accuracy: 0.87,
        precision: 0.86,
        recall: 0.85,
        f1: 0.855,
    },
    Metrics {
        accuracy: 0.83,
        precision: 0.82,
        recall: 0.81,
        f1: 0.815,
    },
    Metrics {
        accuracy: 0.84,
        precision: 0.83,
        recall: 0.82,
        f1: 0.825,
    },
];

/// The five offered models with their evaluation scores.
#[must_use]
pub fn models() -> Vec<ModelDescriptor> {
    MODELS
        .iter()
        .zip(MODEL_METRICS)
        .map(|((id, name), metrics)| ModelDescriptor {
            id: (*id).to_string(),
            display_name: (*name).to_string(),
            metrics,
        })
        .collect()
}

/// Evaluation summary; `overall` mirrors the stacking ensemble.
#[must_use]
pub fn metrics() -> MetricsSummary {
    let per_model: BTreeMap<String, Metrics> = MODELS
        .iter()
        .zip(MODEL_METRICS)
        .map(|((id, _), m)| ((*id).to_string(), m))
        .collect();
    MetricsSummary {
        overall: MODEL_METRICS[2],
        per_model,
        confusion_matrix: [[412, 31, 7], [28, 365, 42], [9, 37, 469]],
    }
}

/// Feature importance in catalogue order (not sorted by weight).
#[must_use]
pub fn feature_importance() -> Vec<FeatureImportance> {
    const WEIGHTS: [f64; 8] = [0.18, 0.09, 0.21, 0.24, 0.08, 0.11, 0.05, 0.04];
    FEATURES
        .iter()
        .zip(WEIGHTS)
        .map(|(f, importance)| FeatureImportance {
            feature_name: f.name.to_string(),
            importance,
        })
        .collect()
}

// =============================================================================
// GENERATED RECORDS
// =============================================================================

/// Generate `n` synthetic dataset rows.
///
/// Row `i` is labelled `CLASS_ORDER[i % 3]` and attributed to
/// `MISSION_CYCLE[i % 3]`; every feature is uniform over its range.
pub fn dataset_rows<R: Rng>(n: usize, rng: &mut R) -> Vec<DatasetRow> {
    (0..n)
        .map(|i| {
            let mission = MISSION_CYCLE[i % MISSION_CYCLE.len()];
            let [
                orbital_period,
                transit_duration,
                planetary_radius,
                transit_depth,
                stellar_teff,
                stellar_radius,
                stellar_logg,
                stellar_metallicity,
            ] = FEATURES.map(|f| rng.gen_range(f.range.0..f.range.1));
            DatasetRow {
                id: format!("{}-{:04}", mission.id_prefix(), i + 1),
                mission,
                label: CLASS_ORDER[i % CLASS_ORDER.len()],
                orbital_period,
                transit_duration,
                planetary_radius,
                transit_depth,
                stellar_teff,
                stellar_radius,
                stellar_logg,
                stellar_metallicity,
            }
        })
        .collect()
}

/// Dataset page answering `query` from a freshly generated set.
pub fn dataset<R: Rng>(query: &DatasetQuery, rng: &mut R) -> DatasetPage {
    crate::dataset::apply_query(dataset_rows(SUBSTITUTE_DATASET_ROWS, rng), query)
}

fn shap_entry<R: Rng>(feature: &str, value: f64, rng: &mut R) -> ShapContribution {
    ShapContribution {
        feature: feature.to_string(),
        value,
        contribution: rng.gen_range(-SHAP_SPREAD..SHAP_SPREAD),
    }
}

/// Heuristic prediction with one SHAP entry per request key.
pub fn prediction<R: Rng>(request: &PredictionRequest, rng: &mut R) -> PredictionResult {
    let signal = TransitSignal::from_features(&request.feature_values);
    let (predicted_class, class_probabilities) = heuristic::classify(signal);
    let shap_contributions = request
        .feature_values
        .iter()
        .map(|(feature, value)| shap_entry(feature, *value, rng))
        .collect();
    PredictionResult {
        predicted_class,
        class_probabilities,
        shap_contributions,
        rationale: heuristic::rationale(predicted_class, signal),
    }
}

/// SHAP attributions for a handful of synthetic objects.
pub fn shap_samples<R: Rng>(rng: &mut R) -> Vec<ShapSample> {
    dataset_rows(SUBSTITUTE_SHAP_SAMPLES, rng)
        .into_iter()
        .map(|row| ShapSample {
            shap: FEATURES
                .iter()
                .map(|f| shap_entry(f.name, row.feature(f.name).unwrap_or_default(), rng))
                .collect(),
            id: row.id,
        })
        .collect()
}

/// Annotated CSV for an uploaded batch.
///
/// Input that is not valid CSV yields the appended header only.
#[must_use]
pub fn batch_prediction(upload: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(upload);
    crate::csv::annotate_predictions(&text)
        .or_else(|_| crate::csv::annotate_predictions(""))
        .unwrap_or_default()
        .into_bytes()
}
