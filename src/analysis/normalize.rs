//! Backend payload → canonical `DiagnosisResult`.
//!
//! All key-spelling variants are resolved here and nowhere else. Keys are
//! tried in priority order; the first one carrying a readable confidence
//! wins. Values may be `{"confidence": n}` objects or bare numbers.
//! Confidence bounds are not checked.

use serde_json::{Map, Value};

use crate::models::DiagnosisResult;

/// Diacritic spelling first, then the ASCII-folded one, then English.
const HEALTHY_KEYS: &[&str] = &["Saudável", "Saudavel", "Healthy"];
const SICK_KEYS: &[&str] = &["Doente", "Sick"];
const CATARACT_KEYS: &[&str] = &["Catarata", "Cataract"];
const GLAUCOMA_KEYS: &[&str] = &["Glaucoma"];

pub fn normalize(raw: &Map<String, Value>) -> DiagnosisResult {
    let result = DiagnosisResult::new(
        resolve(raw, HEALTHY_KEYS),
        resolve(raw, SICK_KEYS),
        resolve(raw, CATARACT_KEYS),
        resolve(raw, GLAUCOMA_KEYS),
    );

    let unknown: Vec<&str> = raw
        .keys()
        .map(String::as_str)
        .filter(|k| !is_known_key(k))
        .collect();
    if !unknown.is_empty() {
        tracing::debug!(keys = ?unknown, "Ignoring unrecognised result keys");
    }

    result
}

fn resolve(raw: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .find_map(|key| raw.get(*key).and_then(confidence_of))
}

fn confidence_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Object(fields) => fields.get("confidence").and_then(Value::as_f64),
        _ => None,
    }
}

fn is_known_key(key: &str) -> bool {
    [HEALTHY_KEYS, SICK_KEYS, CATARACT_KEYS, GLAUCOMA_KEYS]
        .iter()
        .any(|keys| keys.contains(&key))
}
