//! Per-record dominant condition for the history listing.

use serde::Serialize;

use super::classify::pick_dominant;
use crate::client::AnalysisBackend;
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::models::{Condition, HistoryRecord, Severity};
use crate::workflow::notice::NoticeBoard;

pub const HISTORY_LOAD_FAILED: &str = "Erro ao carregar histórico. Tente novamente mais tarde.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DominantCondition {
    pub condition: Condition,
    pub percentage: f64,
    pub severity: Severity,
}

/// Same tie-break as the three-way policy: healthy, cataract, glaucoma.
pub fn dominant_condition(record: &HistoryRecord) -> DominantCondition {
    let dominant = pick_dominant(record.healthy, record.cataract, record.glaucoma);
    DominantCondition {
        condition: dominant.condition,
        percentage: dominant.confidence,
        severity: dominant.condition.severity(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: HistoryRecord,
    pub dominant: DominantCondition,
}

/// Annotate each record, keeping backend order.
pub fn aggregate(records: Vec<HistoryRecord>) -> Vec<HistoryEntry> {
    records
        .into_iter()
        .map(|record| {
            let dominant = dominant_condition(&record);
            HistoryEntry { record, dominant }
        })
        .collect()
}

/// Fetch and annotate the history listing.
///
/// Failures raise a notice for the user and are returned to the caller.
pub async fn load_history<B: AnalysisBackend>(
    backend: &B,
    notices: &NoticeBoard,
    config: &WorkflowConfig,
    api_port: Option<u16>,
) -> Result<Vec<HistoryEntry>, WorkflowError> {
    match backend.list_history().await {
        Ok(records) => {
            tracing::debug!(count = records.len(), "History loaded");
            Ok(aggregate(records))
        }
        Err(e) => {
            tracing::warn!(error = %e, "History listing failed");
            notices.show(HISTORY_LOAD_FAILED, config.notice_duration);
            Err(WorkflowError::from_client(&e, api_port))
        }
    }
}
