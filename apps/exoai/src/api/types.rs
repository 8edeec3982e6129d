//! # Stub Server Response Types
//!
//! The stub serves the shared contract types from `exoai_core` directly;
//! only the error body and the root banner are local.

use serde::{Deserialize, Serialize};

/// Text returned by `GET /`.
pub const ROOT_BANNER: &str = "api is live";

/// Error body for rejected requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
