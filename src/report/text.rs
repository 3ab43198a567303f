//! Plain-text report export.

use super::{format_percent, ReportMeta, DISCLAIMER_TEXT, FOOTER_TEXT};
use crate::models::{DiagnosisResult, Label};

/// Three-way text summary of `result`.
pub fn render_text(result: &DiagnosisResult, meta: &ReportMeta) -> String {
    let mut out = String::new();
    out.push_str("EYE SENSE - RELATÓRIO DE ANÁLISE OFTALMOLÓGICA\n\n");
    out.push_str(&format!("Data: {}\n", meta.generated_at.format("%d/%m/%Y")));
    out.push_str(&format!("Usuário: {}\n", meta.user_email));
    out.push_str(&format!("Arquivo: {}\n\n", meta.file_name));

    out.push_str("RESULTADOS DA ANÁLISE:\n");
    for (name, label) in [
        ("Olho Normal", Label::Healthy),
        ("Catarata", Label::Cataract),
        ("Glaucoma", Label::Glaucoma),
    ] {
        out.push_str(&format!(
            "- {name}: {}\n",
            format_percent(result.confidence(label))
        ));
    }

    out.push_str("\nRECOMENDAÇÃO:\n");
    out.push_str(&meta.recommendation);
    out.push_str("\n\nIMPORTANTE:\n");
    out.push_str(DISCLAIMER_TEXT);
    out.push_str("\n\n");
    out.push_str(FOOTER_TEXT);
    out
}
