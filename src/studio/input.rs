use base64::Engine;

use crate::error::AppError;
use crate::validation;

const BASE64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Validate a candidate binary input and encode it as a data URL.
///
/// Rejects anything whose declared content type is not an image; the caller
/// publishes the returned string as the session's new original image.
pub fn accept_image_bytes(bytes: &[u8], mime: &str) -> Result<String, AppError> {
    validation::require_image_mime(mime)?;
    if bytes.is_empty() {
        return Err(AppError::Validation("请选择图片文件".into()));
    }
    Ok(encode_data_url(mime, bytes))
}

/// Encode raw bytes as a self-describing data URL, directly embeddable
/// as an image source.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// The base64 body of a data URL. A bare base64 string passes through
/// unchanged so both forms are accepted on the wire.
pub fn data_url_body(data_url: &str) -> &str {
    match data_url.split_once(',') {
        Some((_, body)) => body,
        None => data_url,
    }
}

/// The MIME type declared by a data URL, if any.
pub fn data_url_mime(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:")?;
    let header = rest.split_once(',')?.0;
    let mime = header.split(';').next().unwrap_or("");
    (!mime.is_empty()).then_some(mime)
}

/// Decode a data URL (or bare base64 string) back to raw bytes.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>, AppError> {
    BASE64
        .decode(data_url_body(data_url))
        .map_err(|e| AppError::Validation(format!("Invalid image payload: {e}")))
}
