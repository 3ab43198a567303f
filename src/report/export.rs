//! Report files in the exports directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::pdf::render_pdf;
use super::text::render_text;
use super::{ReportError, ReportRequest};

/// `eye-sense-analise-YYYY-MM-DD-<epoch millis>.pdf`
pub fn pdf_file_name(at: DateTime<Utc>) -> String {
    format!(
        "eye-sense-analise-{}-{}.pdf",
        at.format("%Y-%m-%d"),
        at.timestamp_millis()
    )
}

/// `eye-sense-report-YYYY-MM-DD.txt`
pub fn text_file_name(at: DateTime<Utc>) -> String {
    format!("eye-sense-report-{}.txt", at.format("%Y-%m-%d"))
}

/// Write `bytes` to `dir/file_name`, creating `dir` when missing.
pub fn write_export(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), size = bytes.len(), "Report exported");
    Ok(path)
}

pub fn export_pdf(request: &ReportRequest, dir: &Path) -> Result<PathBuf, ReportError> {
    let document = request.document();
    let bytes = render_pdf(&document)?;
    write_export(dir, &pdf_file_name(Utc::now()), &bytes)
}

pub fn export_text(request: &ReportRequest, dir: &Path) -> Result<PathBuf, ReportError> {
    let content = render_text(&request.result, &request.meta);
    write_export(dir, &text_file_name(Utc::now()), content.as_bytes())
}
