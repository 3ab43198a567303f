use serde::{Deserialize, Deserializer, Serialize};

/// One persisted analysis as returned by the history listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub object_id: i64,
    #[serde(default)]
    pub model_version: String,
    #[serde(default, rename = "healthyProbability", deserialize_with = "null_as_zero")]
    pub healthy: f64,
    #[serde(default, rename = "catarataProbability", deserialize_with = "null_as_zero")]
    pub cataract: f64,
    #[serde(default, rename = "glaucomaProbability", deserialize_with = "null_as_zero")]
    pub glaucoma: f64,
}

/// The listing sends `null` for probabilities it never computed.
fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}
