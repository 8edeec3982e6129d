//! # ExoAI HTTP Client
//!
//! Transport to the remote classification service. One call per logical
//! operation, no retries, a fixed per-call timeout and the same headers on
//! every request.
//!
//! Responses are parsed into the core contract types and checked with
//! `ResponseContract` before they are returned, so a payload that breaks
//! its contract surfaces as `TransportError::MalformedResponse` instead of
//! reaching a consumer.

use exoai_core::csv::{CONFIDENCE_COLUMN, PREDICTED_CLASS_COLUMN};
use exoai_core::primitives::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use exoai_core::{
    DatasetPage, DatasetQuery, FeatureImportance, HealthStatus, MetricsSummary, ModelDescriptor,
    PredictionRequest, PredictionResult, ResponseContract, ShapSample,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Errors from the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Cannot reach the service.
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// No complete response within the configured timeout.
    #[error("{path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },

    /// The service answered with a non-2xx status.
    #[error("{path} returned {status}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    /// The body could not be parsed or broke its contract.
    #[error("Malformed response from {path}: {reason}")]
    MalformedResponse { path: String, reason: String },

    /// The client could not be built from its configuration.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Connection settings for `ExoClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
        }
    }
}

/// HTTP client that wraps calls to the classification service.
#[derive(Debug, Clone)]
pub struct ExoClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ExoClient {
    /// Build a client with uniform headers and the configured timeout.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref key) = config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| TransportError::Config(format!("API key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("exoai/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Build a request for `path` and log the attempt.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "exoai request");
        let url = format!("{}{}", self.base_url, path);
        self.http.request(method, url)
    }

    fn map_reqwest(&self, path: &str, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                path: path.to_string(),
                timeout: self.timeout,
            }
        } else {
            TransportError::ConnectionFailed {
                url: format!("{}{}", self.base_url, path),
                reason: err.to_string(),
            }
        }
    }

    /// Send a request and reject non-2xx statuses.
    async fn send(&self, path: &str, req: RequestBuilder) -> Result<Response, TransportError> {
        let resp = req.send().await.map_err(|e| self.map_reqwest(path, e))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    /// Read the body, parse it and check its contract.
    async fn parse<T>(&self, path: &str, resp: Response) -> Result<T, TransportError>
    where
        T: DeserializeOwned + ResponseContract,
    {
        let bytes = resp.bytes().await.map_err(|e| self.map_reqwest(path, e))?;
        let value: T =
            serde_json::from_slice(&bytes).map_err(|e| TransportError::MalformedResponse {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        value
            .check()
            .map_err(|e| TransportError::MalformedResponse {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        Ok(value)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, TransportError>
    where
        T: DeserializeOwned + ResponseContract,
    {
        let req = self.request(Method::GET, path);
        let resp = self.send(path, req).await?;
        self.parse(path, resp).await
    }

    /// GET /health
    pub async fn health(&self) -> Result<HealthStatus, TransportError> {
        self.get_json("/health").await
    }

    /// GET /models → offered classifiers.
    pub async fn models(&self) -> Result<Vec<ModelDescriptor>, TransportError> {
        self.get_json("/models").await
    }

    /// GET /metrics → evaluation summary.
    pub async fn metrics(&self) -> Result<MetricsSummary, TransportError> {
        self.get_json("/metrics").await
    }

    /// GET /features → feature importance.
    pub async fn features(&self) -> Result<Vec<FeatureImportance>, TransportError> {
        self.get_json("/features").await
    }

    /// POST /predict → classify one object.
    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, TransportError> {
        let path = "/predict";
        let req = self.request(Method::POST, path).json(request);
        let resp = self.send(path, req).await?;
        self.parse(path, resp).await
    }

    /// GET /dataset?mission&page&limit&search → one page of rows.
    pub async fn dataset(&self, query: &DatasetQuery) -> Result<DatasetPage, TransportError> {
        let path = "/dataset";
        let req = self.request(Method::GET, path).query(query);
        let resp = self.send(path, req).await?;
        self.parse(path, resp).await
    }

    /// GET /shap/sample → attributions for sample objects.
    pub async fn shap_samples(&self) -> Result<Vec<ShapSample>, TransportError> {
        self.get_json("/shap/sample").await
    }

    /// POST /predict-csv → annotated CSV for an uploaded batch.
    ///
    /// The response must be CSV whose header ends with the two appended
    /// prediction columns.
    pub async fn predict_csv(
        &self,
        file_name: &str,
        csv: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError> {
        let path = "/predict-csv";
        let malformed = |reason: String| TransportError::MalformedResponse {
            path: path.to_string(),
            reason,
        };

        let part = reqwest::multipart::Part::bytes(csv)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| TransportError::Config(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let req = self.request(Method::POST, path).multipart(form);
        let resp = self.send(path, req).await?;
        let bytes = resp.bytes().await.map_err(|e| self.map_reqwest(path, e))?;

        let text = std::str::from_utf8(&bytes).map_err(|e| malformed(e.to_string()))?;
        let rows = exoai_core::csv::parse(text).map_err(|e| malformed(e.to_string()))?;
        let header = rows
            .first()
            .ok_or_else(|| malformed("empty CSV body".to_string()))?;
        let tail: Vec<&str> = header.iter().rev().take(2).rev().map(String::as_str).collect();
        if tail != [PREDICTED_CLASS_COLUMN, CONFIDENCE_COLUMN] {
            return Err(malformed(format!(
                "header does not end with {PREDICTED_CLASS_COLUMN},{CONFIDENCE_COLUMN}"
            )));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ExoClient::new(ClientConfig {
            base_url: "http://localhost:8000/".into(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn api_key_with_control_characters_is_rejected() {
        let result = ExoClient::new(ClientConfig {
            api_key: Some("bad\nkey".into()),
            ..ClientConfig::default()
        });
        assert!(matches!(result, Err(TransportError::Config(_))));
    }
}
