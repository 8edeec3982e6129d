//! # Response Contracts
//!
//! Semantic checks applied to every response after deserialization.
//!
//! serde already enforces the field set and the value types; these checks
//! cover what types cannot express (ranges, probability sums, non-empty
//! identifiers). A failed check means the payload must not reach a consumer.

use crate::primitives::PROBABILITY_SUM_TOLERANCE;
use crate::types::{
    ClassProbabilities, DatasetPage, ExoError, FeatureImportance, HealthStatus, Metrics,
    MetricsSummary, ModelDescriptor, PredictionResult, ShapContribution, ShapSample,
};

/// Post-deserialization validation of a response payload.
pub trait ResponseContract {
    fn check(&self) -> Result<(), ExoError>;
}

fn violation(msg: impl Into<String>) -> ExoError {
    ExoError::Contract(msg.into())
}

fn check_unit_interval(what: &str, value: f64) -> Result<(), ExoError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(violation(format!("{what} = {value} is outside [0, 1]")))
    }
}

fn check_non_empty(what: &str, value: &str) -> Result<(), ExoError> {
    if value.trim().is_empty() {
        Err(violation(format!("{what} is empty")))
    } else {
        Ok(())
    }
}

impl<T: ResponseContract> ResponseContract for Vec<T> {
    fn check(&self) -> Result<(), ExoError> {
        self.iter().try_for_each(ResponseContract::check)
    }
}

impl ResponseContract for HealthStatus {
    fn check(&self) -> Result<(), ExoError> {
        check_non_empty("status", &self.status)
    }
}

impl ResponseContract for Metrics {
    fn check(&self) -> Result<(), ExoError> {
        for (name, value) in ["accuracy", "precision", "recall", "f1"]
            .into_iter()
            .zip(self.values())
        {
            check_unit_interval(name, value)?;
        }
        Ok(())
    }
}

impl ResponseContract for ModelDescriptor {
    fn check(&self) -> Result<(), ExoError> {
        check_non_empty("model id", &self.id)?;
        check_non_empty("display_name", &self.display_name)?;
        self.metrics.check()
    }
}

impl ResponseContract for MetricsSummary {
    fn check(&self) -> Result<(), ExoError> {
        self.overall.check()?;
        if self.per_model.is_empty() {
            return Err(violation("per_model lists no models"));
        }
        if self.confusion_matrix.iter().flatten().all(|&n| n == 0) {
            return Err(violation("confusion_matrix holds no counts"));
        }
        for (id, metrics) in &self.per_model {
            check_non_empty("per_model key", id)?;
            metrics.check()?;
        }
        Ok(())
    }
}

impl ResponseContract for FeatureImportance {
    fn check(&self) -> Result<(), ExoError> {
        check_non_empty("feature_name", &self.feature_name)?;
        check_unit_interval(&format!("importance of {}", self.feature_name), self.importance)
    }
}

impl ResponseContract for ClassProbabilities {
    fn check(&self) -> Result<(), ExoError> {
        check_unit_interval("p(confirmed)", self.confirmed)?;
        check_unit_interval("p(candidate)", self.candidate)?;
        check_unit_interval("p(false_positive)", self.false_positive)?;
        let sum = self.sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(violation(format!("class probabilities sum to {sum}")));
        }
        Ok(())
    }
}

impl ResponseContract for ShapContribution {
    fn check(&self) -> Result<(), ExoError> {
        check_non_empty("shap feature", &self.feature)?;
        if !self.value.is_finite() || !self.contribution.is_finite() {
            return Err(violation(format!("non-finite shap entry for {}", self.feature)));
        }
        Ok(())
    }
}

impl ResponseContract for PredictionResult {
    fn check(&self) -> Result<(), ExoError> {
        self.class_probabilities.check()?;
        self.shap_contributions.check()
    }
}

impl ResponseContract for DatasetPage {
    fn check(&self) -> Result<(), ExoError> {
        if (self.rows.len() as u64) > self.total {
            return Err(violation(format!(
                "page holds {} rows but total is {}",
                self.rows.len(),
                self.total
            )));
        }
        for row in &self.rows {
            check_non_empty("row id", &row.id)?;
        }
        Ok(())
    }
}

impl ResponseContract for ShapSample {
    fn check(&self) -> Result<(), ExoError> {
        check_non_empty("sample id", &self.id)?;
        self.shap.check()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::Class;

    fn result(p: ClassProbabilities) -> PredictionResult {
        PredictionResult {
            predicted_class: Class::Candidate,
            class_probabilities: p,
            shap_contributions: vec![],
            rationale: String::new(),
        }
    }

    #[test]
    fn probabilities_must_sum_to_one() {
        assert!(result(ClassProbabilities::new(0.3, 0.6, 0.1)).check().is_ok());
        assert!(result(ClassProbabilities::new(0.3, 0.3, 0.1)).check().is_err());
        assert!(result(ClassProbabilities::new(1.2, -0.3, 0.1)).check().is_err());
    }

    #[test]
    fn importance_out_of_range_is_rejected() {
        let fi = FeatureImportance {
            feature_name: "transit_depth".into(),
            importance: 1.5,
        };
        assert!(matches!(fi.check(), Err(ExoError::Contract(_))));
        assert!(vec![fi].check().is_err());
    }

    #[test]
    fn page_total_must_cover_rows() {
        let page = DatasetPage {
            rows: vec![],
            total: 0,
        };
        assert!(page.check().is_ok());
    }

    #[test]
    fn metrics_summary_needs_models_and_counts() {
        let valid = crate::substitute::metrics();
        assert!(valid.check().is_ok());

        let mut no_models = valid.clone();
        no_models.per_model.clear();
        assert!(matches!(no_models.check(), Err(ExoError::Contract(_))));

        let mut empty_matrix = valid;
        empty_matrix.confusion_matrix = [[0; 3]; 3];
        assert!(matches!(empty_matrix.check(), Err(ExoError::Contract(_))));
    }

    #[test]
    fn nan_metrics_are_rejected() {
        let m = Metrics {
            accuracy: f64::NAN,
            precision: 0.5,
            recall: 0.5,
            f1: 0.5,
        };
        assert!(m.check().is_err());
    }
}
