use std::io::Cursor;

use crate::error::AppError;
use crate::studio::input;

/// Read the system clipboard, returning the first image as a PNG data URL.
///
/// Non-image clipboard content is skipped silently (`Ok(None)`) — pasting
/// text or files must neither change state nor surface an error.
pub fn read_clipboard_image() -> Result<Option<String>, AppError> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| AppError::Internal(format!("Clipboard unavailable: {e}")))?;

    match clipboard.get_image() {
        Ok(image) => {
            let png = encode_rgba_png(image.width, image.height, &image.bytes)?;
            tracing::debug!(
                width = image.width,
                height = image.height,
                "Image pasted from clipboard"
            );
            Ok(Some(input::encode_data_url("image/png", &png)))
        }
        Err(arboard::Error::ContentNotAvailable) => Ok(None),
        Err(e) => Err(AppError::Internal(format!("Clipboard read failed: {e}"))),
    }
}

/// PNG-encode a raw RGBA buffer as delivered by the clipboard.
fn encode_rgba_png(width: usize, height: usize, rgba: &[u8]) -> Result<Vec<u8>, AppError> {
    let buffer = image::RgbaImage::from_raw(width as u32, height as u32, rgba.to_vec())
        .ok_or_else(|| AppError::Internal("Clipboard image buffer size mismatch".into()))?;

    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(buffer)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| AppError::Internal(format!("PNG encode failed: {e}")))?;
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_rgba_png_produces_png_magic() {
        // 2x2 opaque red square
        let rgba = [255u8, 0, 0, 255].repeat(4);
        let png = encode_rgba_png(2, 2, &rgba).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_encode_rgba_png_rejects_bad_buffer() {
        // 3 bytes cannot be a 2x2 RGBA image
        assert!(encode_rgba_png(2, 2, &[1, 2, 3]).is_err());
    }
}
