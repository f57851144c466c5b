use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Generation history
// ============================================================================

/// One completed input/output pair. Created only when a generation succeeds,
/// never mutated afterwards, removed only by capacity truncation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    /// Time-derived id (UUID v7), unique per insertion.
    pub id: String,
    /// Data-URL of the source photo.
    pub original_image: String,
    /// Data-URL of the stylized portrait.
    pub result_image: String,
    /// Display name of the preset used, e.g. "黑白电影感".
    pub style_name: String,
    /// Unix milliseconds at insertion.
    pub created_at: i64,
}

impl GenerationRecord {
    pub fn new(original_image: String, result_image: String, style_name: String) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            original_image,
            result_image,
            style_name,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
