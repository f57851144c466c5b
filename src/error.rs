use serde::Serialize;

/// App-wide error type. Every fallible function returns `Result<T, AppError>`.
/// Serializes cleanly for Tauri IPC so the frontend gets structured error messages.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Generation(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Human-readable message for the session's error banner.
    /// Generation and validation failures carry their own text; everything
    /// else falls back to the generic failure message the product uses.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Generation(msg) | AppError::Validation(msg) if !msg.trim().is_empty() => {
                msg.clone()
            }
            AppError::Http(e) => e.to_string(),
            _ => "生成失败".to_string(),
        }
    }
}

/// Tauri requires `Serialize` on command return errors.
/// We serialize as `{ error: "...", kind: "..." }` for frontend consumption.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("AppError", 2)?;
        s.serialize_field("error", &self.to_string())?;
        s.serialize_field(
            "kind",
            match self {
                AppError::Database(_) => "database",
                AppError::Pool(_) => "pool",
                AppError::NotFound(_) => "not_found",
                AppError::Validation(_) => "validation",
                AppError::Io(_) => "io",
                AppError::Serde(_) => "serde",
                AppError::Http(_) => "http",
                AppError::Generation(_) => "generation",
                AppError::Internal(_) => "internal",
            },
        )?;
        s.end()
    }
}
