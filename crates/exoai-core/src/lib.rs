//! # exoai-core
//!
//! The offline half of the ExoAI exoplanet dashboard data layer.
//!
//! This crate holds everything that does not need a network:
//! - the response shapes shared by the live service and local substitutes
//! - contract checks applied to responses before they reach a consumer
//! - classification form validation
//! - substitute data and the heuristic classifier behind it
//! - CSV export and batch annotation
//! - the key-value persistence port and the latest-classification store
//! - request sequencing for latest-wins consumers
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - Randomness is always passed in, never reached for
//! - Every substitute has exactly the field set of its live counterpart

// =============================================================================
// MODULES
// =============================================================================

pub mod contract;
pub mod csv;
pub mod dataset;
pub mod heuristic;
pub mod history;
pub mod primitives;
pub mod sequence;
pub mod storage;
pub mod substitute;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Class, ClassProbabilities, ClassificationHistoryEntry, ConfusionMatrix, DatasetPage,
    DatasetQuery, DatasetRow, ExoError, FeatureImportance, FieldError, HealthStatus, Metrics,
    MetricsSummary, Mission, ModelDescriptor, PredictionRequest, PredictionResult,
    ShapContribution, ShapSample, ValidationErrors,
};

// =============================================================================
// RE-EXPORTS: Contracts, Persistence, Sequencing
// =============================================================================

pub use contract::ResponseContract;
pub use heuristic::TransitSignal;
pub use history::HistoryStore;
pub use sequence::{RequestSequencer, Ticket};
pub use storage::{KeyValueStore, MemoryStore, RedbStore};
pub use validation::ClassificationForm;
