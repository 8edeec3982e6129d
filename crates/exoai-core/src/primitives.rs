//! # Fixed Constants
//!
//! Compile-time constants shared by the live and the offline providers.
//!
//! Anything a dashboard, the stub backend and the substitute generators must
//! agree on lives here: class and mission cycles, the feature catalogue with
//! its ranges, and the storage key of the latest classification.

use crate::types::{Class, Mission};

// =============================================================================
// TRANSPORT DEFAULTS
// =============================================================================

/// Base URL used when no configuration supplies one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Per-call timeout for the transport client, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Model used when a prediction request does not name one.
pub const DEFAULT_MODEL_ID: &str = "stacking";

/// Models offered by the classification service: `(id, display name)`.
pub const MODELS: [(&str, &str); 5] = [
    ("random_forest", "Random Forest"),
    ("adaboost", "AdaBoost"),
    ("stacking", "Stacking Ensemble"),
    ("random_subspace", "Random Subspace"),
    ("extra_trees", "Extra Trees"),
];

/// Whether `id` names an offered model.
pub fn is_known_model(id: &str) -> bool {
    MODELS.iter().any(|(known, _)| *known == id)
}

/// Notification text raised on every fallback.
pub const OFFLINE_NOTICE: &str = "Backend offline - using mock data";

// =============================================================================
// CLASS & MISSION CYCLES
// =============================================================================

/// Classes in confusion-matrix order.
pub const CLASS_ORDER: [Class; 3] = [Class::Confirmed, Class::Candidate, Class::FalsePositive];

/// Mission cycle used by the dataset substitute.
pub const MISSION_CYCLE: [Mission; 3] = [Mission::Kepler, Mission::K2, Mission::Tess];

/// Rows generated for the dataset substitute before filtering.
pub const SUBSTITUTE_DATASET_ROWS: usize = 100;

/// Number of samples returned by the SHAP substitute.
pub const SUBSTITUTE_SHAP_SAMPLES: usize = 5;

// =============================================================================
// DATASET PAGINATION
// =============================================================================

/// Page size when a dataset query does not specify one.
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// Upper bound on a single dataset page.
pub const MAX_PAGE_LIMIT: u32 = 500;

// =============================================================================
// FEATURE CATALOGUE
// =============================================================================

/// One numeric feature of a dataset row.
///
/// `range` is the half-open interval substitute values are drawn from.
/// `bounds` is the closed interval the classification form accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub range: (f64, f64),
    pub bounds: (f64, f64),
}

/// The eight features every dataset row carries, in column order.
pub const FEATURES: [FeatureSpec; 8] = [
    FeatureSpec {
        name: "orbital_period",
        label: "Orbital Period",
        unit: "days",
        range: (1.0, 501.0),
        bounds: (0.1, 10_000.0),
    },
    FeatureSpec {
        name: "transit_duration",
        label: "Transit Duration",
        unit: "hours",
        range: (1.0, 13.0),
        bounds: (0.1, 100.0),
    },
    FeatureSpec {
        name: "planetary_radius",
        label: "Planetary Radius",
        unit: "earth radii",
        range: (0.5, 20.5),
        bounds: (0.01, 100.0),
    },
    FeatureSpec {
        name: "transit_depth",
        label: "Transit Depth",
        unit: "ppm",
        range: (50.0, 5050.0),
        bounds: (0.0, 1_000_000.0),
    },
    FeatureSpec {
        name: "stellar_teff",
        label: "Stellar Effective Temperature",
        unit: "K",
        range: (3000.0, 8000.0),
        bounds: (2000.0, 50_000.0),
    },
    FeatureSpec {
        name: "stellar_radius",
        label: "Stellar Radius",
        unit: "solar radii",
        range: (0.5, 3.0),
        bounds: (0.05, 100.0),
    },
    FeatureSpec {
        name: "stellar_logg",
        label: "Stellar Surface Gravity",
        unit: "log10(cm/s^2)",
        range: (3.5, 5.0),
        bounds: (0.0, 6.0),
    },
    FeatureSpec {
        name: "stellar_metallicity",
        label: "Stellar Metallicity",
        unit: "dex",
        range: (-0.5, 0.5),
        bounds: (-3.0, 1.0),
    },
];

/// Look up a feature by its wire name.
pub fn feature_spec(name: &str) -> Option<&'static FeatureSpec> {
    FEATURES.iter().find(|f| f.name == name)
}

// =============================================================================
// HEURISTIC KEY ALIASES
// =============================================================================

/// Keys accepted for transit depth (ppm), in priority order.
pub const DEPTH_KEYS: [&str; 3] = ["transit_depth", "koi_depth", "depth"];

/// Keys accepted for planetary radius, in priority order.
pub const RADIUS_KEYS: [&str; 3] = ["planetary_radius", "koi_prad", "radius"];

/// Keys accepted for orbital period, in priority order.
pub const PERIOD_KEYS: [&str; 3] = ["orbital_period", "koi_period", "period"];

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Storage key of the most recent classification.
pub const LAST_CLASSIFICATION_KEY: &str = "exoai.last_classification";

/// Tolerance for class probabilities summing to one.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 0.02;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn feature_ranges_are_inside_form_bounds() {
        for f in &FEATURES {
            assert!(f.range.0 < f.range.1, "{}", f.name);
            assert!(f.bounds.0 <= f.range.0 && f.range.1 <= f.bounds.1, "{}", f.name);
        }
    }

    #[test]
    fn feature_lookup() {
        assert_eq!(feature_spec("transit_depth").map(|f| f.unit), Some("ppm"));
        assert!(feature_spec("koi_depth").is_none());
    }

    #[test]
    fn default_model_is_offered() {
        assert!(is_known_model(DEFAULT_MODEL_ID));
        assert!(!is_known_model("svm"));
    }
}
