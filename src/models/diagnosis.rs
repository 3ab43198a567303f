use serde::{Deserialize, Serialize};

use super::enums::Label;

/// Canonical classification result: confidence (0-100) per label.
///
/// Every label may be absent independently; one backend generation never
/// reports `Sick`. Absence stays distinguishable from an explicit 0 through
/// [`DiagnosisResult::get`], while [`DiagnosisResult::confidence`] reads 0.
/// Built by the normalizer and read-only afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    healthy: Option<f64>,
    sick: Option<f64>,
    cataract: Option<f64>,
    glaucoma: Option<f64>,
}

impl DiagnosisResult {
    pub fn new(
        healthy: Option<f64>,
        sick: Option<f64>,
        cataract: Option<f64>,
        glaucoma: Option<f64>,
    ) -> Self {
        Self {
            healthy,
            sick,
            cataract,
            glaucoma,
        }
    }

    /// Raw presence-aware read.
    pub fn get(&self, label: Label) -> Option<f64> {
        match label {
            Label::Healthy => self.healthy,
            Label::Sick => self.sick,
            Label::Cataract => self.cataract,
            Label::Glaucoma => self.glaucoma,
        }
    }

    /// Confidence for `label`, 0 when absent.
    pub fn confidence(&self, label: Label) -> f64 {
        self.get(label).unwrap_or(0.0)
    }

    pub fn has(&self, label: Label) -> bool {
        self.get(label).is_some()
    }

    /// True when no label at all was reported.
    pub fn is_empty(&self) -> bool {
        self.healthy.is_none()
            && self.sick.is_none()
            && self.cataract.is_none()
            && self.glaucoma.is_none()
    }
}
