pub mod gemini;

use async_trait::async_trait;

use crate::error::AppError;

/// Seam to the external generation collaborator.
///
/// Takes the session's original image (data URL) and the resolved style
/// directive, returns the stylized portrait as a data URL. Implementations
/// own their transport; the orchestrator only sees success or a failure
/// carrying a message.
#[async_trait]
pub trait PortraitProvider: Send + Sync {
    async fn stylize(&self, original_image: &str, style_prompt: &str) -> Result<String, AppError>;
}
