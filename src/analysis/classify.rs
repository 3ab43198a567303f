//! Dominant-condition decisions over a `DiagnosisResult`.
//!
//! Two policies coexist, chosen by which labels the backend reported:
//! - three-way: highest of healthy/cataract/glaucoma; ties resolve
//!   healthy > cataract > glaucoma.
//! - two-tier (result carries `Sick`): healthy vs sick first with a strict
//!   `>`, then cataract vs glaucoma (strict `>`) only when sick wins.
//!
//! Pure functions; rendering decides styling from the returned structs.

use serde::Serialize;

use crate::models::{Condition, DiagnosisResult, Label};

const RECOMMENDATION_HEALTHY: &str = "Os resultados indicam um olho aparentemente normal. Continue com exames regulares para manter a saúde ocular.";
const RECOMMENDATION_CATARACT: &str = "Possível presença de catarata detectada. Recomendamos consultar um oftalmologista para avaliação e possível tratamento.";
const RECOMMENDATION_GLAUCOMA: &str = "Possível presença de glaucoma detectada. É importante procurar um oftalmologista imediatamente para exames complementares.";

// ═══════════════════════════════════════════════════════════
// Three-way policy
// ═══════════════════════════════════════════════════════════

/// Winner of a three-way comparison and the confidence it won with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dominant {
    pub condition: Condition,
    pub confidence: f64,
}

/// Shared tie-break: sequential equality checks against the max, first
/// match wins.
pub fn pick_dominant(healthy: f64, cataract: f64, glaucoma: f64) -> Dominant {
    let max = healthy.max(cataract).max(glaucoma);

    if healthy == max {
        Dominant {
            condition: Condition::Healthy,
            confidence: healthy,
        }
    } else if cataract == max {
        Dominant {
            condition: Condition::Cataract,
            confidence: cataract,
        }
    } else {
        Dominant {
            condition: Condition::Glaucoma,
            confidence: glaucoma,
        }
    }
}

pub fn dominant_label(result: &DiagnosisResult) -> Dominant {
    pick_dominant(
        result.confidence(Label::Healthy),
        result.confidence(Label::Cataract),
        result.confidence(Label::Glaucoma),
    )
}

// ═══════════════════════════════════════════════════════════
// Two-tier policy
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Summary {
    Healthy,
    Sick,
}

/// Cataract vs glaucoma, decided only for sick results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubDiagnosis {
    pub cataract: f64,
    pub glaucoma: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwoTierVerdict {
    pub healthy: f64,
    pub sick: f64,
    pub summary: Summary,
    /// Present iff `summary == Sick`.
    pub detail: Option<SubDiagnosis>,
}

pub fn summarize(result: &DiagnosisResult) -> Summary {
    if result.confidence(Label::Healthy) > result.confidence(Label::Sick) {
        Summary::Healthy
    } else {
        Summary::Sick
    }
}

pub fn sub_classify(result: &DiagnosisResult) -> SubDiagnosis {
    let cataract = result.confidence(Label::Cataract);
    let glaucoma = result.confidence(Label::Glaucoma);
    let condition = if cataract > glaucoma {
        Condition::Cataract
    } else {
        Condition::Glaucoma
    };
    SubDiagnosis {
        cataract,
        glaucoma,
        condition,
    }
}

pub fn two_tier(result: &DiagnosisResult) -> TwoTierVerdict {
    let summary = summarize(result);
    TwoTierVerdict {
        healthy: result.confidence(Label::Healthy),
        sick: result.confidence(Label::Sick),
        summary,
        detail: (summary == Summary::Sick).then(|| sub_classify(result)),
    }
}

// ═══════════════════════════════════════════════════════════
// Policy selection
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    ThreeWay,
    TwoTier,
}

impl Policy {
    /// A reported `Sick` confidence selects the two-tier policy.
    pub fn for_result(result: &DiagnosisResult) -> Self {
        if result.has(Label::Sick) {
            Self::TwoTier
        } else {
            Self::ThreeWay
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Verdict {
    ThreeWay(Dominant),
    TwoTier(TwoTierVerdict),
}

impl Verdict {
    pub fn policy(&self) -> Policy {
        match self {
            Self::ThreeWay(_) => Policy::ThreeWay,
            Self::TwoTier(_) => Policy::TwoTier,
        }
    }

    /// Condition the recommendation is written for.
    pub fn condition(&self) -> Condition {
        match self {
            Self::ThreeWay(dominant) => dominant.condition,
            Self::TwoTier(verdict) => match verdict.detail {
                Some(detail) => detail.condition,
                None => Condition::Healthy,
            },
        }
    }
}

pub fn classify(result: &DiagnosisResult) -> Verdict {
    match Policy::for_result(result) {
        Policy::ThreeWay => Verdict::ThreeWay(dominant_label(result)),
        Policy::TwoTier => Verdict::TwoTier(two_tier(result)),
    }
}

pub fn recommendation_for(condition: Condition) -> &'static str {
    match condition {
        Condition::Healthy => RECOMMENDATION_HEALTHY,
        Condition::Cataract => RECOMMENDATION_CATARACT,
        Condition::Glaucoma => RECOMMENDATION_GLAUCOMA,
    }
}

pub fn recommendation(result: &DiagnosisResult) -> &'static str {
    recommendation_for(classify(result).condition())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three(healthy: f64, cataract: f64, glaucoma: f64) -> DiagnosisResult {
        DiagnosisResult::new(Some(healthy), None, Some(cataract), Some(glaucoma))
    }

    fn four(healthy: f64, sick: f64, cataract: f64, glaucoma: f64) -> DiagnosisResult {
        DiagnosisResult::new(Some(healthy), Some(sick), Some(cataract), Some(glaucoma))
    }

    #[test]
    fn strict_winner_is_reported() {
        assert_eq!(dominant_label(&three(85.0, 10.0, 5.0)).condition, Condition::Healthy);
        assert_eq!(dominant_label(&three(25.0, 70.0, 5.0)).condition, Condition::Cataract);
        let d = dominant_label(&three(20.0, 15.0, 65.0));
        assert_eq!(d.condition, Condition::Glaucoma);
        assert_eq!(d.confidence, 65.0);
    }

    #[test]
    fn healthy_wins_tie_with_cataract() {
        assert_eq!(dominant_label(&three(50.0, 50.0, 0.0)).condition, Condition::Healthy);
    }

    #[test]
    fn cataract_wins_tie_with_glaucoma() {
        assert_eq!(dominant_label(&three(0.0, 50.0, 50.0)).condition, Condition::Cataract);
    }

    #[test]
    fn three_way_tie_goes_to_healthy() {
        assert_eq!(dominant_label(&three(50.0, 50.0, 50.0)).condition, Condition::Healthy);
    }

    #[test]
    fn absent_labels_read_as_zero() {
        let only_glaucoma = DiagnosisResult::new(None, None, None, Some(12.0));
        assert_eq!(dominant_label(&only_glaucoma).condition, Condition::Glaucoma);

        // Everything absent: all zero, healthy wins the tie.
        let empty = DiagnosisResult::default();
        let d = dominant_label(&empty);
        assert_eq!(d.condition, Condition::Healthy);
        assert_eq!(d.confidence, 0.0);
    }

    #[test]
    fn every_strict_permutation() {
        let cases = [
            ((90.0, 5.0, 5.0), Condition::Healthy),
            ((5.0, 90.0, 5.0), Condition::Cataract),
            ((5.0, 5.0, 90.0), Condition::Glaucoma),
            ((40.0, 30.0, 30.0), Condition::Healthy),
            ((30.0, 40.0, 30.0), Condition::Cataract),
            ((30.0, 30.0, 40.0), Condition::Glaucoma),
        ];
        for ((h, c, g), expected) in cases {
            assert_eq!(dominant_label(&three(h, c, g)).condition, expected, "{h}/{c}/{g}");
        }
    }

    #[test]
    fn two_tier_healthy_summary() {
        let result = DiagnosisResult::new(Some(60.0), Some(40.0), None, None);
        let verdict = two_tier(&result);
        assert_eq!(verdict.summary, Summary::Healthy);
        assert!(verdict.detail.is_none());
    }

    #[test]
    fn two_tier_sick_with_cataract_detail() {
        let verdict = two_tier(&four(30.0, 70.0, 80.0, 20.0));
        assert_eq!(verdict.summary, Summary::Sick);
        let detail = verdict.detail.unwrap();
        assert_eq!(detail.condition, Condition::Cataract);
        assert_eq!(detail.cataract, 80.0);
    }

    #[test]
    fn two_tier_tie_counts_as_sick() {
        // Strict greater-than: equal confidences are not healthy.
        let verdict = two_tier(&four(50.0, 50.0, 10.0, 10.0));
        assert_eq!(verdict.summary, Summary::Sick);
        // And an equal sub-split goes to glaucoma.
        assert_eq!(verdict.detail.unwrap().condition, Condition::Glaucoma);
    }

    #[test]
    fn sick_presence_selects_two_tier() {
        assert_eq!(Policy::for_result(&three(1.0, 2.0, 3.0)), Policy::ThreeWay);
        let with_zero_sick = DiagnosisResult::new(Some(10.0), Some(0.0), None, None);
        assert_eq!(Policy::for_result(&with_zero_sick), Policy::TwoTier);
    }

    #[test]
    fn policies_can_disagree() {
        // Three-way would pick healthy (60 > 30 > 20); two-tier says sick.
        let result = four(60.0, 70.0, 30.0, 20.0);
        assert_eq!(dominant_label(&result).condition, Condition::Healthy);
        let verdict = classify(&result);
        assert_eq!(verdict.policy(), Policy::TwoTier);
        assert_eq!(verdict.condition(), Condition::Cataract);
    }

    #[test]
    fn recommendation_follows_selected_policy() {
        assert_eq!(recommendation(&three(85.0, 10.0, 5.0)), RECOMMENDATION_HEALTHY);
        assert_eq!(recommendation(&three(20.0, 15.0, 65.0)), RECOMMENDATION_GLAUCOMA);
        assert_eq!(recommendation(&four(30.0, 70.0, 80.0, 20.0)), RECOMMENDATION_CATARACT);
        assert_eq!(
            recommendation(&DiagnosisResult::new(Some(60.0), Some(40.0), None, None)),
            RECOMMENDATION_HEALTHY
        );
    }

    #[test]
    fn recommendation_texts_are_distinct() {
        let texts = [
            recommendation_for(Condition::Healthy),
            recommendation_for(Condition::Cataract),
            recommendation_for(Condition::Glaucoma),
        ];
        assert_ne!(texts[0], texts[1]);
        assert_ne!(texts[1], texts[2]);
        assert!(texts[2].contains("glaucoma"));
    }
}
