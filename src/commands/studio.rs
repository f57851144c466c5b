use std::sync::Arc;
use tauri::{AppHandle, State};

use crate::clipboard;
use crate::error::AppError;
use crate::studio::provider::gemini::GeminiPortraitProvider;
use crate::studio::{self, input, styles, StudioSnapshot};
use crate::AppState;

#[tauri::command]
pub fn get_studio_state(state: State<'_, Arc<AppState>>) -> StudioSnapshot {
    state.studio.snapshot()
}

#[tauri::command]
pub fn list_style_presets() -> Vec<styles::StylePreset> {
    styles::presets().to_vec()
}

#[tauri::command]
pub fn select_style(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    id: String,
) -> Result<StudioSnapshot, AppError> {
    let snapshot = state.studio.select_style(&id)?;
    studio::emit_state(&app, &snapshot);
    Ok(snapshot)
}

/// Accept an image picked (or dragged) in the frontend. Non-image content
/// types are rejected with a short user-facing message.
#[tauri::command]
pub fn import_image(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
    bytes: Vec<u8>,
    mime: String,
) -> Result<StudioSnapshot, AppError> {
    let data_url = input::accept_image_bytes(&bytes, &mime)?;
    let snapshot = state.studio.accept_image(data_url);
    studio::emit_state(&app, &snapshot);
    Ok(snapshot)
}

/// Route a Ctrl+V through the same accept path as the file picker.
/// Returns None (and leaves the session untouched) when the clipboard
/// holds no image.
#[tauri::command]
pub fn paste_image(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
) -> Result<Option<StudioSnapshot>, AppError> {
    match clipboard::read_clipboard_image()? {
        None => Ok(None),
        Some(data_url) => {
            let snapshot = state.studio.accept_image(data_url);
            studio::emit_state(&app, &snapshot);
            Ok(Some(snapshot))
        }
    }
}

#[tauri::command]
pub async fn generate_portrait(
    app: AppHandle,
    state: State<'_, Arc<AppState>>,
) -> Result<StudioSnapshot, AppError> {
    let provider = Arc::new(GeminiPortraitProvider::from_config(&state.db)?);
    studio::generate(state.studio.clone(), state.db.clone(), provider, Some(app)).await
}

/// Write the current result image to `path` (the frontend supplies a
/// location from the save dialog).
#[tauri::command]
pub async fn export_result(
    state: State<'_, Arc<AppState>>,
    path: String,
) -> Result<String, AppError> {
    let snapshot = state.studio.snapshot();
    let Some(result_image) = snapshot.result_image else {
        return Err(AppError::Validation("没有可下载的结果图片".into()));
    };
    let bytes = input::decode_data_url(&result_image)?;
    tokio::fs::write(&path, bytes).await?;
    tracing::info!(path = %path, "Result image exported");
    Ok(path)
}
