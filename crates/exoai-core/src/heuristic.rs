//! # Heuristic Classifier
//!
//! The offline stand-in for the stacking model. Three thresholds on transit
//! depth, planetary radius and orbital period pick a class, and each class
//! carries a fixed probability triple.
//!
//! | class          | condition                                      | probabilities      |
//! |----------------|------------------------------------------------|--------------------|
//! | confirmed      | depth > 1000 and radius > 1.0 and period > 10  | 0.75 / 0.20 / 0.05 |
//! | candidate      | depth > 500 and radius > 0.3                   | 0.30 / 0.60 / 0.10 |
//! | false_positive | otherwise                                      | 0.10 / 0.20 / 0.70 |
//!
//! The thresholds are demo values, not astrophysics. They are kept exactly
//! as dashboards and tests rely on them.

use crate::primitives::{DEPTH_KEYS, PERIOD_KEYS, RADIUS_KEYS};
use crate::types::{Class, ClassProbabilities};
use std::collections::BTreeMap;

pub const CONFIRMED_MIN_DEPTH: f64 = 1000.0;
pub const CONFIRMED_MIN_RADIUS: f64 = 1.0;
pub const CONFIRMED_MIN_PERIOD: f64 = 10.0;
pub const CANDIDATE_MIN_DEPTH: f64 = 500.0;
pub const CANDIDATE_MIN_RADIUS: f64 = 0.3;

/// The three inputs the heuristic looks at. Missing values are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransitSignal {
    pub depth: f64,
    pub radius: f64,
    pub period: f64,
}

impl TransitSignal {
    #[must_use]
    pub const fn new(depth: f64, radius: f64, period: f64) -> Self {
        Self {
            depth,
            radius,
            period,
        }
    }

    /// Resolve the three inputs from arbitrary feature keys.
    ///
    /// The first alias present wins (`transit_depth` before `koi_depth`
    /// before `depth`, and likewise for radius and period).
    #[must_use]
    pub fn from_features(features: &BTreeMap<String, f64>) -> Self {
        let pick = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| features.get(*k).copied())
                .unwrap_or(0.0)
        };
        Self {
            depth: pick(&DEPTH_KEYS),
            radius: pick(&RADIUS_KEYS),
            period: pick(&PERIOD_KEYS),
        }
    }
}

/// Fixed probability triple for each class.
#[must_use]
pub const fn probabilities_for(class: Class) -> ClassProbabilities {
    match class {
        Class::Confirmed => ClassProbabilities::new(0.75, 0.20, 0.05),
        Class::Candidate => ClassProbabilities::new(0.30, 0.60, 0.10),
        Class::FalsePositive => ClassProbabilities::new(0.10, 0.20, 0.70),
    }
}

/// Pick a class for the given signal.
#[must_use]
pub fn classify(signal: TransitSignal) -> (Class, ClassProbabilities) {
    let class = if signal.depth > CONFIRMED_MIN_DEPTH
        && signal.radius > CONFIRMED_MIN_RADIUS
        && signal.period > CONFIRMED_MIN_PERIOD
    {
        Class::Confirmed
    } else if signal.depth > CANDIDATE_MIN_DEPTH && signal.radius > CANDIDATE_MIN_RADIUS {
        Class::Candidate
    } else {
        Class::FalsePositive
    };
    (class, probabilities_for(class))
}

/// One-sentence explanation of a heuristic decision.
#[must_use]
pub fn rationale(class: Class, signal: TransitSignal) -> String {
    let TransitSignal {
        depth,
        radius,
        period,
    } = signal;
    match class {
        Class::Confirmed => format!(
            "Deep transit ({depth:.0} ppm) from a {radius:.2} R⊕ body on a {period:.1}-day orbit is consistent with a planet."
        ),
        Class::Candidate => format!(
            "Transit depth of {depth:.0} ppm and radius {radius:.2} R⊕ are planet-like but the {period:.1}-day orbit needs follow-up."
        ),
        Class::FalsePositive => format!(
            "Shallow or undersized signal ({depth:.0} ppm, {radius:.2} R⊕) is more likely noise or an eclipsing binary."
        ),
    }
}
