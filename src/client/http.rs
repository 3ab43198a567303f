use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};

use super::{AnalysisBackend, AuthBackend, BackendResponse, ClientError, LoginResponse};
use crate::config::AppConfig;
use crate::models::{HistoryRecord, SelectedFile};

/// HTTP client for the Eye Sense backend.
///
/// Keeps a cookie store so the session opened by `/login` is carried on
/// `/upload` and `/history/list`.
pub struct EyeSenseClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl EyeSenseClient {
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Setup(e.to_string()))?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: config.timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_connect() {
            ClientError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else if e.is_request() {
            ClientError::Connection(self.base_url.clone())
        } else {
            ClientError::Http {
                status: 0,
                body: e.to_string(),
            }
        }
    }

    /// Map non-success statuses onto the error taxonomy.
    async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status.is_server_error() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                detail: server_detail(&body),
            });
        }
        Err(ClientError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

/// Pull a human-readable message out of an error body, if there is one.
fn server_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "detail", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl AnalysisBackend for EyeSenseClient {
    async fn upload(&self, file: &SelectedFile) -> Result<BackendResponse, ClientError> {
        let url = self.url("upload");
        tracing::debug!(url = %url, file = %file.name, size = file.size_bytes(), "Uploading image for analysis");

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ClientError::InvalidArtifact(e.to_string()))?;
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let response = Self::check_status(response).await?;

        let parsed: BackendResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ResponseParsing(e.to_string()))?;

        tracing::info!(
            request_id = %parsed.request_id,
            model_version = %parsed.model_version,
            label = %parsed.label,
            "Analysis response received"
        );
        Ok(parsed)
    }

    async fn list_history(&self) -> Result<Vec<HistoryRecord>, ClientError> {
        let url = self.url("history/list");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let response = Self::check_status(response).await?;

        let records: Vec<HistoryRecord> = response
            .json()
            .await
            .map_err(|e| ClientError::ResponseParsing(e.to_string()))?;
        tracing::debug!(count = records.len(), "History listed");
        Ok(records)
    }
}

impl AuthBackend for EyeSenseClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let url = self.url("login");
        let response = self
            .client
            .post(&url)
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let response = Self::check_status(response).await?;

        let parsed: LoginResponse = response
            .json()
            .await
            .map_err(|e| ClientError::ResponseParsing(e.to_string()))?;
        if !parsed.success {
            return Err(ClientError::Rejected(
                parsed.error.unwrap_or_else(|| "Login failed".to_string()),
            ));
        }
        Ok(parsed)
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let url = self.url("logout");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        Self::check_status(response).await?;
        Ok(())
    }
}
