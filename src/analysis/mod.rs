//! Pure analysis of backend results: normalization, classification and
//! history annotation.

pub mod classify;
pub mod history;
pub mod normalize;

use serde::Serialize;

use crate::client::BackendResponse;
use crate::models::DiagnosisResult;

use self::classify::Verdict;

/// Outcome of one successful upload, ready for display and reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub result: DiagnosisResult,
    pub verdict: Verdict,
    pub recommendation: String,
    /// Label the backend itself attached, informational only.
    pub backend_label: String,
    pub request_id: String,
    pub model_version: String,
    pub image_url: String,
}

impl Analysis {
    pub fn from_response(response: BackendResponse) -> Self {
        let result = normalize::normalize(&response.analysis_result);
        let verdict = classify::classify(&result);
        let recommendation = classify::recommendation_for(verdict.condition()).to_string();

        if !response.label.is_empty()
            && response.label != verdict.condition().label().display_name()
        {
            tracing::debug!(
                backend_label = %response.label,
                condition = %verdict.condition(),
                "Backend label differs from local verdict"
            );
        }

        Self {
            result,
            verdict,
            recommendation,
            backend_label: response.label,
            request_id: response.request_id,
            model_version: response.model_version,
            image_url: response.image_url,
        }
    }
}
