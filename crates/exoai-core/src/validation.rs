//! # Classification Form Validation
//!
//! Raw form input is checked here before any request is built. A form that
//! fails validation never reaches the transport; the caller gets one
//! `FieldError` per rejected field instead.
//!
//! Rules:
//! - every feature in `FEATURES` is required
//! - values must parse as finite numbers inside the feature's form bounds
//! - unknown field names are rejected
//! - `model_id`, when given, must name an offered model

use crate::primitives::{DEFAULT_MODEL_ID, FEATURES, feature_spec, is_known_model};
use crate::types::{ExoError, PredictionRequest, ValidationErrors};
use std::collections::BTreeMap;

/// Unvalidated classification form: field name to raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationForm {
    pub model_id: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl ClassificationForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw field value, replacing any earlier one.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Select the model to classify with.
    #[must_use]
    pub fn model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Validate every field and build the request.
    ///
    /// All problems are collected; the error lists each rejected field once.
    pub fn validate(&self) -> Result<PredictionRequest, ExoError> {
        let mut errors = ValidationErrors::default();
        let mut values = BTreeMap::new();

        let model_id = match self.model_id.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_MODEL_ID.to_string(),
            Some(id) if is_known_model(id) => id.to_string(),
            Some(id) => {
                errors.push("model_id", format!("unknown model '{id}'"));
                id.to_string()
            }
        };

        for name in self.fields.keys() {
            if feature_spec(name).is_none() {
                errors.push(name.as_str(), "unknown feature");
            }
        }

        for spec in &FEATURES {
            let raw = self.fields.get(spec.name).map(|s| s.trim()).unwrap_or("");
            if raw.is_empty() {
                errors.push(spec.name, format!("{} is required", spec.label));
                continue;
            }
            let value: f64 = match raw.parse() {
                Ok(v) => v,
                Err(_) => {
                    errors.push(spec.name, format!("{} must be a number", spec.label));
                    continue;
                }
            };
            if !value.is_finite() {
                errors.push(spec.name, format!("{} must be finite", spec.label));
                continue;
            }
            let (lo, hi) = spec.bounds;
            if value < lo || value > hi {
                errors.push(
                    spec.name,
                    format!("{} must be between {lo} and {hi} {}", spec.label, spec.unit),
                );
                continue;
            }
            values.insert(spec.name.to_string(), value);
        }

        if errors.is_empty() {
            Ok(PredictionRequest::with_model(model_id, values))
        } else {
            Err(ExoError::Validation(errors))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn earth_like() -> ClassificationForm {
        ClassificationForm::new()
            .field("orbital_period", "365.25")
            .field("transit_duration", "13.5")
            .field("planetary_radius", "1.0")
            .field("transit_depth", "1000")
            .field("stellar_teff", "5778")
            .field("stellar_radius", "1.0")
            .field("stellar_logg", "4.44")
            .field("stellar_metallicity", "0.0")
    }

    fn field_errors(form: &ClassificationForm) -> ValidationErrors {
        match form.validate() {
            Err(ExoError::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn valid_form_builds_request_with_default_model() {
        let req = earth_like().validate().unwrap();
        assert_eq!(req.model_id, "stacking");
        assert_eq!(req.feature_values.len(), 8);
        assert_eq!(req.feature_values["transit_depth"], 1000.0);
    }

    #[test]
    fn explicit_model_is_kept() {
        let req = earth_like().model("extra_trees").validate().unwrap();
        assert_eq!(req.model_id, "extra_trees");
    }

    #[test]
    fn missing_and_malformed_fields_are_all_reported() {
        let mut form = earth_like().field("transit_depth", "deep");
        form.fields.remove("stellar_logg");
        let errors = field_errors(&form);
        assert_eq!(errors.0.len(), 2);
        assert!(errors.for_field("transit_depth").unwrap().contains("number"));
        assert!(errors.for_field("stellar_logg").unwrap().contains("required"));
    }

    #[test]
    fn out_of_bounds_and_non_finite_values_are_rejected() {
        let form = earth_like()
            .field("stellar_teff", "100")
            .field("orbital_period", "inf");
        let errors = field_errors(&form);
        assert!(errors.for_field("stellar_teff").unwrap().contains("between"));
        assert!(errors.for_field("orbital_period").unwrap().contains("finite"));
    }

    #[test]
    fn unknown_model_and_feature_are_rejected() {
        let form = earth_like().model("svm").field("koi_score", "0.9");
        let errors = field_errors(&form);
        assert!(errors.for_field("model_id").is_some());
        assert_eq!(errors.for_field("koi_score"), Some("unknown feature"));
    }
}
