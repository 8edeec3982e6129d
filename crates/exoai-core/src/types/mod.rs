//! # Core Type Definitions
//!
//! The data shapes every provider must produce, live or substituted:
//! - Classification vocabulary (`Class`, `Mission`)
//! - Service responses (`HealthStatus`, `ModelDescriptor`, `MetricsSummary`,
//!   `FeatureImportance`, `PredictionResult`, `DatasetPage`, `ShapSample`)
//! - Requests (`PredictionRequest`, `DatasetQuery`)
//! - Locally persisted state (`ClassificationHistoryEntry`)
//! - Error types (`ExoError`, `ValidationErrors`)
//!
//! All records are plain snapshots with snake_case JSON keys. Nothing here
//! has a lifecycle; a value is produced once and handed to its consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::primitives::{DEFAULT_MODEL_ID, DEFAULT_PAGE_LIMIT};

// =============================================================================
// CLASS & MISSION
// =============================================================================

/// Disposition assigned to an observed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Class {
    Confirmed,
    Candidate,
    FalsePositive,
}

impl Class {
    /// Wire name of the class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Candidate => "candidate",
            Self::FalsePositive => "false_positive",
        }
    }

    /// Position in confusion-matrix order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Confirmed => 0,
            Self::Candidate => 1,
            Self::FalsePositive => 2,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Class {
    type Err = ExoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "candidate" => Ok(Self::Candidate),
            "false_positive" => Ok(Self::FalsePositive),
            other => Err(ExoError::Serialization(format!("Unknown class: {other}"))),
        }
    }
}

/// Survey mission a record originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mission {
    Kepler,
    K2,
    Tess,
}

impl Mission {
    /// Wire name of the mission.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kepler => "kepler",
            Self::K2 => "k2",
            Self::Tess => "tess",
        }
    }

    /// Catalogue prefix used for object identifiers.
    #[must_use]
    pub const fn id_prefix(self) -> &'static str {
        match self {
            Self::Kepler => "KOI",
            Self::K2 => "EPIC",
            Self::Tess => "TOI",
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mission {
    type Err = ExoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kepler" => Ok(Self::Kepler),
            "k2" => Ok(Self::K2),
            "tess" => Ok(Self::Tess),
            other => Err(ExoError::Serialization(format!("Unknown mission: {other}"))),
        }
    }
}

// =============================================================================
// HEALTH
// =============================================================================

/// Connectivity snapshot of the classification service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub last_ingest_timestamp: DateTime<Utc>,
}

// =============================================================================
// MODELS & METRICS
// =============================================================================

/// Evaluation scores of one classifier, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Metrics {
    /// Scores in field order.
    #[must_use]
    pub const fn values(&self) -> [f64; 4] {
        [self.accuracy, self.precision, self.recall, self.f1]
    }
}

/// A classification algorithm offered by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub display_name: String,
    pub metrics: Metrics,
}

/// Counts indexed `[actual][predicted]` in `CLASS_ORDER`.
pub type ConfusionMatrix = [[u64; 3]; 3];

/// Aggregate evaluation of all offered models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub overall: Metrics,
    pub per_model: BTreeMap<String, Metrics>,
    pub confusion_matrix: ConfusionMatrix,
}

/// Relative weight of one input feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature_name: String,
    pub importance: f64,
}

// =============================================================================
// PREDICTION
// =============================================================================

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

/// A single-object classification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    pub feature_values: BTreeMap<String, f64>,
}

impl PredictionRequest {
    /// Request against the default model.
    #[must_use]
    pub fn new(feature_values: BTreeMap<String, f64>) -> Self {
        Self {
            model_id: default_model_id(),
            feature_values,
        }
    }

    /// Request against a named model.
    #[must_use]
    pub fn with_model(model_id: impl Into<String>, feature_values: BTreeMap<String, f64>) -> Self {
        Self {
            model_id: model_id.into(),
            feature_values,
        }
    }
}

/// Probability assigned to each class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub confirmed: f64,
    pub candidate: f64,
    pub false_positive: f64,
}

impl ClassProbabilities {
    #[must_use]
    pub const fn new(confirmed: f64, candidate: f64, false_positive: f64) -> Self {
        Self {
            confirmed,
            candidate,
            false_positive,
        }
    }

    #[must_use]
    pub const fn get(&self, class: Class) -> f64 {
        match class {
            Class::Confirmed => self.confirmed,
            Class::Candidate => self.candidate,
            Class::FalsePositive => self.false_positive,
        }
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.confirmed + self.candidate + self.false_positive
    }

    /// Most probable class and its probability. Ties resolve in class order.
    #[must_use]
    pub fn max(&self) -> (Class, f64) {
        crate::primitives::CLASS_ORDER
            .iter()
            .fold((Class::Confirmed, f64::MIN), |best, &class| {
                let p = self.get(class);
                if p > best.1 { (class, p) } else { best }
            })
    }
}

/// Per-feature attribution of a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapContribution {
    pub feature: String,
    pub value: f64,
    pub contribution: f64,
}

/// Outcome of a single-object classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_class: Class,
    pub class_probabilities: ClassProbabilities,
    pub shap_contributions: Vec<ShapContribution>,
    pub rationale: String,
}

impl PredictionResult {
    /// Probability of the predicted class.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.class_probabilities.get(self.predicted_class)
    }
}

// =============================================================================
// DATASET
// =============================================================================

/// One observed object with its eight features and assigned label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub id: String,
    pub mission: Mission,
    pub label: Class,
    pub orbital_period: f64,
    pub transit_duration: f64,
    pub planetary_radius: f64,
    pub transit_depth: f64,
    pub stellar_teff: f64,
    pub stellar_radius: f64,
    pub stellar_logg: f64,
    pub stellar_metallicity: f64,
}

impl DatasetRow {
    /// Value of a feature by wire name.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<f64> {
        match name {
            "orbital_period" => Some(self.orbital_period),
            "transit_duration" => Some(self.transit_duration),
            "planetary_radius" => Some(self.planetary_radius),
            "transit_depth" => Some(self.transit_depth),
            "stellar_teff" => Some(self.stellar_teff),
            "stellar_radius" => Some(self.stellar_radius),
            "stellar_logg" => Some(self.stellar_logg),
            "stellar_metallicity" => Some(self.stellar_metallicity),
            _ => None,
        }
    }

    /// All eight features keyed by name.
    #[must_use]
    pub fn features(&self) -> BTreeMap<String, f64> {
        crate::primitives::FEATURES
            .iter()
            .filter_map(|f| self.feature(f.name).map(|v| (f.name.to_string(), v)))
            .collect()
    }

    /// Flat JSON record in declaration order, ready for CSV export.
    pub fn to_record(&self) -> Result<serde_json::Map<String, serde_json::Value>, ExoError> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err(ExoError::Serialization(
                "dataset row did not serialize to an object".to_string(),
            )),
            Err(e) => Err(ExoError::Serialization(e.to_string())),
        }
    }
}

/// Filter and pagination parameters of a dataset request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mission: Option<Mission>,
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for DatasetQuery {
    fn default() -> Self {
        Self {
            mission: None,
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            search: None,
        }
    }
}

/// One page of dataset rows plus the size of the filtered set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPage {
    pub rows: Vec<DatasetRow>,
    pub total: u64,
}

/// SHAP attributions of one sample object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapSample {
    pub id: String,
    pub shap: Vec<ShapContribution>,
}

// =============================================================================
// HISTORY
// =============================================================================

/// A completed classification kept in local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationHistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub input_features: BTreeMap<String, f64>,
    pub result: PredictionResult,
}

impl ClassificationHistoryEntry {
    /// Stamp a new entry with a fresh id and the current time.
    #[must_use]
    pub fn new(input_features: BTreeMap<String, f64>, result: PredictionResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            input_features,
            result,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// A rejected form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field error found in one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message recorded for a field, if any.
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Errors raised by the core crate.
///
/// Transport failures live in the app crate; everything here is either a
/// rejected input, a broken contract or a storage problem.
#[derive(Debug, Error)]
pub enum ExoError {
    /// User input rejected before any request was made.
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),

    /// A response violated its shape contract.
    #[error("Contract violation: {0}")]
    Contract(String),

    /// The key-value store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// CSV input could not be parsed.
    #[error("CSV error: {0}")]
    Csv(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn class_wire_names() {
        let json = serde_json::to_string(&Class::FalsePositive).unwrap();
        assert_eq!(json, "\"false_positive\"");
        assert_eq!("False Positive".parse::<Class>().unwrap(), Class::FalsePositive);
        assert!("planet".parse::<Class>().is_err());
    }

    #[test]
    fn mission_wire_names() {
        let json = serde_json::to_string(&Mission::K2).unwrap();
        assert_eq!(json, "\"k2\"");
        assert_eq!("TESS".parse::<Mission>().unwrap(), Mission::Tess);
    }

    #[test]
    fn prediction_request_defaults_to_stacking() {
        let req: PredictionRequest =
            serde_json::from_str(r#"{"feature_values":{"transit_depth":1.0}}"#).unwrap();
        assert_eq!(req.model_id, "stacking");
    }

    #[test]
    fn probabilities_max_prefers_class_order_on_tie() {
        let p = ClassProbabilities::new(0.4, 0.4, 0.2);
        assert_eq!(p.max(), (Class::Confirmed, 0.4));
        let p = ClassProbabilities::new(0.1, 0.2, 0.7);
        assert_eq!(p.max().0, Class::FalsePositive);
    }

    #[test]
    fn dataset_query_skips_empty_filters() {
        let json = serde_json::to_value(DatasetQuery::default()).unwrap();
        assert_eq!(json, serde_json::json!({"page": 1, "limit": 25}));
    }

    #[test]
    fn dataset_row_record_keeps_declaration_order() {
        let row = DatasetRow {
            id: "KOI-0001".into(),
            mission: Mission::Kepler,
            label: Class::Confirmed,
            orbital_period: 1.0,
            transit_duration: 2.0,
            planetary_radius: 3.0,
            transit_depth: 4.0,
            stellar_teff: 5.0,
            stellar_radius: 6.0,
            stellar_logg: 7.0,
            stellar_metallicity: 8.0,
        };
        let keys: Vec<String> = row.to_record().unwrap().keys().cloned().collect();
        assert_eq!(keys[..3], ["id", "mission", "label"]);
        assert_eq!(keys.len(), 11);
        assert_eq!(row.features().len(), 8);
    }

    #[test]
    fn validation_errors_display() {
        let mut errors = ValidationErrors::default();
        errors.push("transit_depth", "required");
        errors.push("model_id", "unknown model");
        assert_eq!(errors.to_string(), "transit_depth: required; model_id: unknown model");
        assert_eq!(errors.for_field("model_id"), Some("unknown model"));
    }
}
