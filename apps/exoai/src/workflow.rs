//! # Classify Workflow
//!
//! Single-shot state machine behind the classification form:
//!
//! ```text
//! Idle ──submit──▶ Submitting ──▶ Succeeded(result)
//!                             └─▶ Failed(errors)
//! ```
//!
//! Validation failures never reach the transport. A successful result is
//! persisted as the latest classification; a persistence failure is logged
//! and does not change the outcome.

use crate::degrade::Dashboard;
use exoai_core::{
    ClassificationForm, ClassificationHistoryEntry, ExoError, HistoryStore, KeyValueStore,
    PredictionResult, ValidationErrors,
};

/// Where the workflow currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyState {
    Idle,
    Submitting,
    Succeeded(PredictionResult),
    Failed(ValidationErrors),
}

impl ClassifyState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }
}

/// Drives one classification at a time against a `Dashboard`.
#[derive(Debug)]
pub struct ClassifyWorkflow<S> {
    dashboard: Dashboard,
    history: HistoryStore<S>,
    state: ClassifyState,
}

impl<S: KeyValueStore> ClassifyWorkflow<S> {
    pub fn new(dashboard: Dashboard, store: S) -> Self {
        Self {
            dashboard,
            history: HistoryStore::new(store),
            state: ClassifyState::Idle,
        }
    }

    pub fn state(&self) -> &ClassifyState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Validate the form, classify it and persist the result.
    pub async fn submit(&mut self, form: &ClassificationForm) -> &ClassifyState {
        let request = match form.validate() {
            Ok(request) => request,
            Err(ExoError::Validation(errors)) => {
                tracing::debug!(%errors, "classification form rejected");
                self.state = ClassifyState::Failed(errors);
                return &self.state;
            }
            Err(other) => {
                let mut errors = ValidationErrors::default();
                errors.push("form", other.to_string());
                self.state = ClassifyState::Failed(errors);
                return &self.state;
            }
        };

        self.state = ClassifyState::Submitting;
        let result = self.dashboard.predict(&request).await;

        let entry = ClassificationHistoryEntry::new(request.feature_values.clone(), result.clone());
        if let Err(e) = self.history.save_last(&entry) {
            tracing::warn!(error = %e, "failed to persist latest classification");
        }

        self.state = ClassifyState::Succeeded(result);
        &self.state
    }

    /// Back to `Idle`, keeping the persisted entry.
    pub fn reset(&mut self) {
        self.state = ClassifyState::Idle;
    }

    /// The persisted latest classification, if any.
    pub fn last_classification(&self) -> Result<Option<ClassificationHistoryEntry>, ExoError> {
        self.history.load_last()
    }
}
