//! # Degradation Policy
//!
//! `Dashboard` is the surface presentation code talks to. It exposes one
//! async method per service operation, and none of them can fail: when the
//! transport returns an error (connection, status, timeout or a malformed
//! payload) the policy
//!
//! 1. logs the failure,
//! 2. sends a `Notice` through the configured `Notifier`,
//! 3. returns the matching substitute from `exoai_core::substitute`.
//!
//! Substitutes are computed synchronously after the failed call returns;
//! nothing is awaited on the fallback path.

use crate::client::{ExoClient, TransportError};
use crate::notify::{LogNotifier, Notice, Notifier};
use exoai_core::{
    DatasetPage, DatasetQuery, FeatureImportance, HealthStatus, MetricsSummary, ModelDescriptor,
    PredictionRequest, PredictionResult, RequestSequencer, ShapSample, substitute,
};
use std::future::Future;
use std::sync::Arc;

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Live,
    Substitute,
}

/// A value together with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: Source,
}

/// Never-failing facade over `ExoClient`.
#[derive(Clone)]
pub struct Dashboard {
    client: ExoClient,
    notifier: Arc<dyn Notifier>,
    sequencer: Arc<RequestSequencer>,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("base_url", &self.client.base_url())
            .finish_non_exhaustive()
    }
}

impl Dashboard {
    /// Wrap a client; fallbacks are reported through `notifier`.
    pub fn new(client: ExoClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            sequencer: Arc::new(RequestSequencer::new()),
        }
    }

    /// Wrap a client, reporting fallbacks as log warnings.
    pub fn with_log_notifier(client: ExoClient) -> Self {
        Self::new(client, Arc::new(LogNotifier))
    }

    pub fn client(&self) -> &ExoClient {
        &self.client
    }

    /// Await `call`; on failure notify and build the substitute.
    async fn resolve<T, Fut, F>(&self, operation: &'static str, call: Fut, substitute: F) -> Sourced<T>
    where
        Fut: Future<Output = Result<T, TransportError>>,
        F: FnOnce() -> T,
    {
        match call.await {
            Ok(value) => Sourced {
                value,
                source: Source::Live,
            },
            Err(err) => {
                tracing::debug!(operation, error = %err, "falling back to substitute data");
                self.notifier.notify(&Notice::offline(operation, &err));
                Sourced {
                    value: substitute(),
                    source: Source::Substitute,
                }
            }
        }
    }

    /// Service health, or the offline record.
    pub async fn health(&self) -> HealthStatus {
        self.health_sourced().await.value
    }

    pub async fn health_sourced(&self) -> Sourced<HealthStatus> {
        self.resolve("health", self.client.health(), substitute::health)
            .await
    }

    /// Offered models.
    pub async fn models(&self) -> Vec<ModelDescriptor> {
        self.resolve("models", self.client.models(), substitute::models)
            .await
            .value
    }

    /// Evaluation summary.
    pub async fn metrics(&self) -> MetricsSummary {
        self.resolve("metrics", self.client.metrics(), substitute::metrics)
            .await
            .value
    }

    /// Feature importance.
    pub async fn features(&self) -> Vec<FeatureImportance> {
        self.resolve(
            "features",
            self.client.features(),
            substitute::feature_importance,
        )
        .await
        .value
    }

    /// Classify one object.
    pub async fn predict(&self, request: &PredictionRequest) -> PredictionResult {
        self.predict_sourced(request).await.value
    }

    pub async fn predict_sourced(&self, request: &PredictionRequest) -> Sourced<PredictionResult> {
        self.resolve("predict", self.client.predict(request), || {
            substitute::prediction(request, &mut rand::thread_rng())
        })
        .await
    }

    /// One page of the dataset.
    pub async fn dataset(&self, query: &DatasetQuery) -> DatasetPage {
        self.resolve("dataset", self.client.dataset(query), || {
            substitute::dataset(query, &mut rand::thread_rng())
        })
        .await
        .value
    }

    /// Like `dataset`, but `None` when a newer dataset request was issued
    /// while this one was in flight.
    pub async fn dataset_latest(&self, query: &DatasetQuery) -> Option<DatasetPage> {
        let ticket = self.sequencer.issue("dataset");
        let page = self.dataset(query).await;
        if self.sequencer.is_current(&ticket) {
            Some(page)
        } else {
            tracing::debug!(seq = ticket.seq, "discarding superseded dataset response");
            None
        }
    }

    /// SHAP attributions of sample objects.
    pub async fn shap_samples(&self) -> Vec<ShapSample> {
        self.resolve("shap_samples", self.client.shap_samples(), || {
            substitute::shap_samples(&mut rand::thread_rng())
        })
        .await
        .value
    }

    /// Annotated CSV for an uploaded batch.
    pub async fn predict_csv(&self, file_name: &str, csv: Vec<u8>) -> Vec<u8> {
        // The upload is consumed by the request; keep a copy for the fallback.
        let upload = csv.clone();
        self.resolve(
            "predict_csv",
            self.client.predict_csv(file_name, csv),
            move || substitute::batch_prediction(&upload),
        )
        .await
        .value
    }
}
