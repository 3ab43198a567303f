//! Diagnostic report synthesis.
//!
//! `layout::build` turns a result plus metadata into a `ReportDocument`:
//! an ordered list of sections already assigned to pages. Renderers
//! (`pdf`, `text`) only draw what the layout decided.

pub mod export;
pub mod layout;
pub mod pdf;
pub mod text;

pub use layout::{build, ReportDocument};

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::DiagnosisResult;

pub const REPORT_TITLE: &str = "EYE SENSE";
pub const REPORT_SUBTITLE: &str = "Análise Oftalmológica Inteligente";
pub const FOOTER_TEXT: &str = "Eye Sense - Análise Inteligente de Saúde Ocular";
pub const DISCLAIMER_TITLE: &str = "IMPORTANTE";
pub const DISCLAIMER_TEXT: &str = "Este relatório é baseado em análise de inteligência artificial e não substitui a consulta com um profissional médico qualificado. Sempre procure um oftalmologista para diagnóstico e tratamento adequados.";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything about a report that is not the diagnosis itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportMeta {
    pub user_email: String,
    pub file_name: String,
    /// Already formatted, e.g. `1.5 MB`.
    pub file_size: String,
    pub generated_at: NaiveDateTime,
    /// `data:` URL of the analyzed image, when one was rendered.
    pub preview: Option<String>,
    pub recommendation: String,
}

/// Inputs of one report, as handed out by the workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub result: DiagnosisResult,
    pub meta: ReportMeta,
}

impl ReportRequest {
    pub fn document(&self) -> ReportDocument {
        build(&self.result, &self.meta)
    }
}

/// `70` → `70%`, `20.5` → `20.5%`.
pub fn format_percent(value: f64) -> String {
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed}%")
}

/// pt-BR timestamp shown in the report header.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format("%d/%m/%Y %H:%M").to_string()
}
