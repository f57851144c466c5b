mod clipboard;
mod commands;
pub mod db;
pub mod error;
mod logging;
pub mod studio;
mod validation;

use std::sync::Arc;

use db::DbPool;
use tauri::Manager;

/// Shared application state accessible from all Tauri commands.
pub struct AppState {
    pub db: DbPool,
    /// The single active session controller.
    pub studio: Arc<studio::Studio>,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Local dev convenience: GEMINI_API_KEY can live in a .env file
    dotenvy::dotenv().ok();
    logging::init();

    tracing::info!("Starting ArtStudio Desktop v{}", env!("CARGO_PKG_VERSION"));

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_window_state::Builder::new().build())
        .setup(|app| {
            let app_data_dir = app
                .path()
                .app_data_dir()
                .expect("Failed to resolve app data directory");

            let pool = db::init_db(&app_data_dir)?;

            // Warm the history cache so a corrupted payload is discarded
            // (and logged) before the first view renders.
            match db::repos::history::load(&pool) {
                Ok(history) => tracing::info!(entries = history.len(), "Generation history loaded"),
                Err(e) => tracing::warn!(error = %e, "Generation history unavailable"),
            }

            let state = Arc::new(AppState {
                db: pool,
                studio: Arc::new(studio::Studio::new()),
            });
            app.manage(state);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            // Studio — session
            commands::studio::get_studio_state,
            commands::studio::list_style_presets,
            commands::studio::select_style,
            commands::studio::import_image,
            commands::studio::paste_image,
            commands::studio::generate_portrait,
            commands::studio::export_result,
            // History
            commands::history::list_history,
            commands::history::restore_history_entry,
            commands::history::clear_history,
            // Settings
            commands::settings::get_app_setting,
            commands::settings::set_app_setting,
            commands::settings::delete_app_setting,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
