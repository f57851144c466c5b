use crate::db::models::GenerationRecord;
use crate::db::repos::settings;
use crate::db::DbPool;
use crate::error::AppError;

/// Settings key holding the serialized history list.
const HISTORY_KEY: &str = "generation_history";

/// Maximum retained generations. Insertion is always at the head;
/// overflow truncates the tail.
pub const MAX_HISTORY: usize = 8;

/// Load the persisted history, most-recent-first.
///
/// Absent or malformed storage yields an empty list — a corrupted payload is
/// logged inside the settings repo and must never crash the application.
pub fn load(pool: &DbPool) -> Result<Vec<GenerationRecord>, AppError> {
    settings::get_json_or_default(pool, HISTORY_KEY)
}

/// Prepend `entry`, truncate to capacity, and persist the new list.
/// Returns the list as stored.
pub fn record(pool: &DbPool, entry: GenerationRecord) -> Result<Vec<GenerationRecord>, AppError> {
    let mut list = load(pool)?;
    list.insert(0, entry);
    list.truncate(MAX_HISTORY);
    settings::set_json(pool, HISTORY_KEY, &list)?;
    Ok(list)
}

/// Find one record by id.
pub fn find(pool: &DbPool, id: &str) -> Result<GenerationRecord, AppError> {
    load(pool)?
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound(format!("GenerationRecord {id}")))
}

/// Drop all history. Returns true if anything was stored.
pub fn clear(pool: &DbPool) -> Result<bool, AppError> {
    settings::delete(pool, HISTORY_KEY)
}
