//! Upload → analyze → display state machine.
//!
//! `AnalysisWorkflow` owns the single in-progress upload, the cosmetic
//! progress ticker and the notice board. All methods take `&self`; state
//! lives behind a mutex that is never held across an `.await`.
//!
//! Every reset, new staging and teardown bumps a generation counter. Late
//! completions (upload response, preview encoding, ticker ticks) carry the
//! generation they started under and are dropped when it no longer matches.

pub mod notice;
pub mod progress;
pub mod validate;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::analysis::Analysis;
use crate::client::AnalysisBackend;
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::models::{ArtifactInfo, SelectedFile, UploadAttempt, UploadStatus};
use crate::report::{ReportMeta, ReportRequest};

use self::notice::{Notice, NoticeBoard};
use self::progress::{advance, random_increment, ProgressTicker};

/// Result of one `analyze` call.
#[derive(Debug)]
pub enum AnalyzeOutcome {
    /// Nothing was sent: no validated file, an analysis already in flight,
    /// or the workflow is torn down.
    Skipped,
    Succeeded(Analysis),
    Failed(WorkflowError),
    /// The response arrived after a reset or teardown and was ignored.
    Discarded,
}

/// Serializable view of the workflow for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub status: UploadStatus,
    pub artifact: Option<ArtifactInfo>,
    pub has_preview: bool,
    pub progress: f64,
    pub analysis: Option<Analysis>,
    pub notice: Option<Notice>,
}

struct Inner {
    status: UploadStatus,
    attempt: Option<UploadAttempt>,
    progress: f64,
    generation: u64,
    ticker: Option<ProgressTicker>,
    preview_task: Option<JoinHandle<()>>,
    analysis: Option<Analysis>,
    torn_down: bool,
}

impl Inner {
    fn new() -> Self {
        Self {
            status: UploadStatus::Idle,
            attempt: None,
            progress: 0.0,
            generation: 0,
            ticker: None,
            preview_task: None,
            analysis: None,
            torn_down: false,
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }

    fn abort_preview(&mut self) {
        if let Some(task) = self.preview_task.take() {
            task.abort();
        }
    }

    fn set_status(&mut self, status: UploadStatus) {
        self.status = status;
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.status = status;
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct AnalysisWorkflow<B> {
    backend: B,
    config: WorkflowConfig,
    api_port: Option<u16>,
    inner: Arc<Mutex<Inner>>,
    notices: NoticeBoard,
}

impl<B: AnalysisBackend> AnalysisWorkflow<B> {
    /// `api_port` only feeds the connection-failure notice.
    pub fn new(backend: B, config: WorkflowConfig, api_port: Option<u16>) -> Self {
        let notices = NoticeBoard::new(config.notice_fade);
        Self {
            backend,
            config,
            api_port,
            inner: Arc::new(Mutex::new(Inner::new())),
            notices,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn api_port(&self) -> Option<u16> {
        self.api_port
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    // ─── Staging ────────────────────────────────────────────

    /// Validate `file` and stage it for analysis.
    ///
    /// A rejected file raises a notice and leaves the current state as it
    /// was. Ignored while an analysis is in flight.
    pub fn select_file(&self, file: SelectedFile) -> Result<(), WorkflowError> {
        if lock(&self.inner).torn_down {
            return Ok(());
        }
        if let Err(e) = validate::validate_file(&file, self.config.max_upload_bytes) {
            let err = WorkflowError::from(e);
            tracing::info!(file = %file.name, error = %err, "File rejected");
            self.notices
                .show(err.user_message(), err.dismiss_after(&self.config));
            return Err(err);
        }

        let mut inner = lock(&self.inner);
        if inner.torn_down {
            return Ok(());
        }
        if inner.status == UploadStatus::InFlight {
            tracing::debug!(file = %file.name, "Selection ignored during analysis");
            return Ok(());
        }

        inner.abort_preview();
        inner.generation += 1;
        let generation = inner.generation;

        tracing::info!(
            file = %file.name,
            size = file.size_bytes(),
            mime = %file.mime_type,
            "File staged"
        );

        let mime_type = file.mime_type.clone();
        let bytes = file.bytes.clone();
        inner.attempt = Some(UploadAttempt::validated(file));
        inner.analysis = None;
        inner.progress = 0.0;
        inner.set_status(UploadStatus::Validated);
        inner.preview_task = Some(self.spawn_preview(generation, mime_type, bytes));
        Ok(())
    }

    /// Encode the preview off the caller's path. Best-effort: a failure
    /// only means there is no preview.
    fn spawn_preview(&self, generation: u64, mime_type: String, bytes: Vec<u8>) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let encoded =
                tokio::task::spawn_blocking(move || validate::data_url(&mime_type, &bytes)).await;
            let url = match encoded {
                Ok(url) => url,
                Err(e) => {
                    tracing::warn!(error = %e, "Preview encoding failed");
                    return;
                }
            };
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut inner = lock(&shared);
            if inner.generation != generation {
                return;
            }
            if let Some(attempt) = inner.attempt.as_mut() {
                attempt.preview = Some(url);
            }
        })
    }

    /// Wait until the preview of the staged file is ready (or has failed).
    pub async fn wait_for_preview(&self) {
        let task = lock(&self.inner).preview_task.take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Drop the staged file and any result.
    pub fn remove_file(&self) {
        self.reset("file removed");
    }

    /// Start over after a finished analysis.
    pub fn new_analysis(&self) {
        self.reset("new analysis");
    }

    fn reset(&self, reason: &str) {
        let mut inner = lock(&self.inner);
        if inner.torn_down {
            return;
        }
        inner.stop_ticker();
        inner.abort_preview();
        inner.generation += 1;
        inner.attempt = None;
        inner.analysis = None;
        inner.progress = 0.0;
        inner.status = UploadStatus::Idle;
        tracing::debug!(reason, "Workflow reset");
    }

    // ─── Analysis ───────────────────────────────────────────

    /// Upload the staged file and classify the response.
    ///
    /// At most one analysis is in flight; a concurrent call returns
    /// `Skipped` without touching the backend. After a failure the staged
    /// file can be analyzed again without selecting it anew.
    pub async fn analyze(&self) -> AnalyzeOutcome {
        let (generation, file) = {
            let mut inner = lock(&self.inner);
            let ready = matches!(inner.status, UploadStatus::Validated | UploadStatus::Failed);
            if inner.torn_down || !ready {
                tracing::debug!(status = %inner.status, "Analyze skipped");
                return AnalyzeOutcome::Skipped;
            }
            let Some(file) = inner.attempt.as_ref().map(|a| a.file.clone()) else {
                return AnalyzeOutcome::Skipped;
            };
            inner.set_status(UploadStatus::InFlight);
            inner.progress = 0.0;
            let generation = inner.generation;
            inner.ticker = Some(self.start_ticker(generation));
            (generation, file)
        };

        let mut guard = AttemptGuard {
            inner: &self.inner,
            generation,
            armed: true,
        };

        let attempt_id = uuid::Uuid::new_v4();
        tracing::info!(%attempt_id, file = %file.name, "Analysis started");
        let response = self.backend.upload(&file).await;
        guard.disarm();

        let mut inner = lock(&self.inner);
        if inner.torn_down || inner.generation != generation {
            tracing::debug!(%attempt_id, "Stale analysis response discarded");
            return AnalyzeOutcome::Discarded;
        }
        inner.stop_ticker();

        match response {
            Ok(response) => {
                let analysis = Analysis::from_response(response);
                inner.progress = 100.0;
                inner.analysis = Some(analysis.clone());
                inner.set_status(UploadStatus::Succeeded);
                drop(inner);
                tracing::info!(
                    %attempt_id,
                    condition = %analysis.verdict.condition(),
                    request_id = %analysis.request_id,
                    "Analysis completed"
                );
                AnalyzeOutcome::Succeeded(analysis)
            }
            Err(e) => {
                inner.progress = 0.0;
                inner.set_status(UploadStatus::Failed);
                drop(inner);
                tracing::warn!(%attempt_id, error = %e, "Analysis failed");
                let err = WorkflowError::from_client(&e, self.api_port);
                self.notices
                    .show(err.user_message(), err.dismiss_after(&self.config));
                AnalyzeOutcome::Failed(err)
            }
        }
    }

    fn start_ticker(&self, generation: u64) -> ProgressTicker {
        let weak = Arc::downgrade(&self.inner);
        let max_increment = self.config.progress_max_increment;
        let cap = self.config.progress_cap;
        ProgressTicker::start(self.config.progress_tick, move || {
            let Some(shared) = weak.upgrade() else {
                return false;
            };
            let mut inner = lock(&shared);
            if inner.generation != generation || inner.status != UploadStatus::InFlight {
                return false;
            }
            inner.progress = advance(inner.progress, random_increment(max_increment), cap);
            true
        })
    }

    // ─── Teardown ───────────────────────────────────────────

    /// Stop every pending task. No state mutation happens afterwards.
    pub fn teardown(&self) {
        {
            let mut inner = lock(&self.inner);
            if inner.torn_down {
                return;
            }
            inner.torn_down = true;
            inner.generation += 1;
            inner.stop_ticker();
            inner.abort_preview();
        }
        self.notices.shutdown();
        tracing::debug!("Workflow torn down");
    }

    // ─── Views ──────────────────────────────────────────────

    pub fn status(&self) -> UploadStatus {
        lock(&self.inner).status
    }

    pub fn progress(&self) -> f64 {
        lock(&self.inner).progress
    }

    pub fn analysis(&self) -> Option<Analysis> {
        lock(&self.inner).analysis.clone()
    }

    pub fn preview(&self) -> Option<String> {
        lock(&self.inner)
            .attempt
            .as_ref()
            .and_then(|a| a.preview.clone())
    }

    pub fn notice(&self) -> Option<Notice> {
        self.notices.current()
    }

    pub fn is_ticking(&self) -> bool {
        lock(&self.inner)
            .ticker
            .as_ref()
            .is_some_and(ProgressTicker::is_active)
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let inner = lock(&self.inner);
        WorkflowSnapshot {
            status: inner.status,
            artifact: inner.attempt.as_ref().map(|a| ArtifactInfo::from(&a.file)),
            has_preview: inner
                .attempt
                .as_ref()
                .is_some_and(|a| a.preview.is_some()),
            progress: inner.progress,
            analysis: inner.analysis.clone(),
            notice: self.notices.current(),
        }
    }

    /// Inputs for the report of the current successful analysis.
    pub fn report_request(&self, user_email: &str) -> Option<ReportRequest> {
        let inner = lock(&self.inner);
        if inner.status != UploadStatus::Succeeded {
            return None;
        }
        let attempt = inner.attempt.as_ref()?;
        let analysis = inner.analysis.as_ref()?;
        Some(ReportRequest {
            result: analysis.result,
            meta: ReportMeta {
                user_email: user_email.to_string(),
                file_name: attempt.file.name.clone(),
                file_size: validate::format_file_size(attempt.file.size_bytes()),
                generated_at: chrono::Local::now().naive_local(),
                preview: attempt.preview.clone(),
                recommendation: analysis.recommendation.clone(),
            },
        })
    }
}

impl<B> Drop for AnalysisWorkflow<B> {
    fn drop(&mut self) {
        let mut inner = lock(&self.inner);
        inner.torn_down = true;
        inner.generation += 1;
        inner.stop_ticker();
        inner.abort_preview();
    }
}

/// Puts an attempt back to `Validated` if the `analyze` future is dropped
/// before the backend answered.
struct AttemptGuard<'a> {
    inner: &'a Mutex<Inner>,
    generation: u64,
    armed: bool,
}

impl AttemptGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = lock(self.inner);
        if inner.generation != self.generation || inner.status != UploadStatus::InFlight {
            return;
        }
        inner.stop_ticker();
        inner.progress = 0.0;
        inner.set_status(UploadStatus::Validated);
        tracing::debug!("Analysis abandoned");
    }
}
