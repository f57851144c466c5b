use crate::error::AppError;

pub fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Reject inputs whose declared content type is not an image.
/// The message is the short user-facing one shown inline in the upload panel.
pub fn require_image_mime(mime: &str) -> Result<(), AppError> {
    if !mime.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(AppError::Validation("请选择图片文件".into()));
    }
    Ok(())
}
