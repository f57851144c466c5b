use std::sync::Arc;
use tauri::{AppHandle, State};

use crate::db::models::GenerationRecord;
use crate::db::repos::history as repo;
use crate::error::AppError;
use crate::studio::{self, StudioSnapshot};
use crate::AppState;

#[tauri::command]
pub fn list_history(state: State<'_, Arc<AppState>>) -> Result<Vec<GenerationRecord>, AppError> {
    repo::load(&state.db)
}

/// Bring a past generation back into the session without re-invoking
/// the external call.
#[tauri::command]
pub fn restore_history_entry(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    id: String,
) -> Result<StudioSnapshot, AppError> {
    let record = repo::find(&state.db, &id)?;
    let snapshot = state.studio.restore_record(&record);
    studio::emit_state(&app, &snapshot);
    Ok(snapshot)
}

#[tauri::command]
pub fn clear_history(state: State<'_, Arc<AppState>>) -> Result<bool, AppError> {
    repo::clear(&state.db)
}
