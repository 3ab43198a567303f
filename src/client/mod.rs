//! Remote collaborators of the core: analysis backend and authentication.
//!
//! The workflow only depends on the traits below. `EyeSenseClient` is the
//! reqwest implementation talking to the Eye Sense backend; tests use
//! in-memory mocks.

pub mod http;

pub use http::EyeSenseClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{HistoryRecord, SelectedFile};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Cannot connect to analysis server at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server error {status}")]
    Server { status: u16, detail: Option<String> },

    #[error("Unexpected HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Response parsing failed: {0}")]
    ResponseParsing(String),

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

/// Envelope returned by `POST /upload`.
///
/// `analysis_result` is kept loose on purpose: key spellings vary between
/// backend generations and are resolved by the normalizer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendResponse {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub analysis_result: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub model_version: String,
}

/// Body returned by `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Remote image classification and history listing.
#[allow(async_fn_in_trait)]
pub trait AnalysisBackend {
    /// Upload one image for classification. Single attempt, no retry.
    async fn upload(&self, file: &SelectedFile) -> Result<BackendResponse, ClientError>;

    /// Past analyses, in backend order.
    async fn list_history(&self) -> Result<Vec<HistoryRecord>, ClientError>;
}

/// Remote credential check.
#[allow(async_fn_in_trait)]
pub trait AuthBackend {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError>;

    async fn logout(&self) -> Result<(), ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_response_deserializes_camel_case() {
        let json = r#"{
            "imageUrl": "https://bucket.example/uploads/123abc.jpg",
            "analysisResult": {
                "Doente": {"confidence": 90},
                "Saudavel": {"confidence": 10}
            },
            "label": "Catarata",
            "requestId": "req-1",
            "modelVersion": "cnn-v1"
        }"#;
        let response: BackendResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.label, "Catarata");
        assert_eq!(response.model_version, "cnn-v1");
        assert!(response.analysis_result.contains_key("Doente"));
    }

    #[test]
    fn backend_response_tolerates_missing_metadata() {
        let response: BackendResponse =
            serde_json::from_str(r#"{"analysisResult": {}}"#).unwrap();
        assert!(response.request_id.is_empty());
        assert!(response.analysis_result.is_empty());
    }

    #[test]
    fn login_response_optional_fields() {
        let response: LoginResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(response.success);
        assert!(response.email.is_none());
    }
}
