//! Conversion of generated or uploaded image payloads into raw bytes.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

use crate::domain::error::DomainError;
use crate::domain::ports::ImageBytes;

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// Decodes base64 image data. A `data:<mime>;base64,` prefix sets the media
/// type; without it the data is assumed to be PNG.
///
/// # Errors
/// [`DomainError::Generation`] if the payload is not valid base64.
pub fn decode_inline(data: &str) -> Result<ImageBytes, DomainError> {
    let (mime_type, encoded) = match data.strip_prefix("data:") {
        Some(rest) => match rest.split_once(";base64,") {
            Some((mime, payload)) if !mime.is_empty() => (mime.to_owned(), payload),
            Some((_, payload)) => (DEFAULT_IMAGE_MIME.to_owned(), payload),
            None => {
                return Err(DomainError::generation(
                    "data URI image is not base64 encoded",
                ));
            }
        },
        None => (DEFAULT_IMAGE_MIME.to_owned(), data),
    };

    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| DomainError::generation(format!("invalid base64 image payload: {e}")))?;

    if bytes.is_empty() {
        return Err(DomainError::generation("image payload is empty"));
    }

    Ok(ImageBytes {
        bytes: Bytes::from(bytes),
        mime_type,
    })
}

/// File extension used in storage paths for a media type.
#[must_use]
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let essence = mime_type
        .parse::<mime::Mime>()
        .map(|m| m.essence_str().to_owned())
        .unwrap_or_default();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}
