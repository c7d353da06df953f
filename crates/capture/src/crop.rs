//! Crop a captured screenshot down to a thumbnail.
//!
//! Screenshots travel as base64 `data:` URIs. Cropping decodes the payload,
//! clamps the requested rectangle into the source bounds (rounding overshoot
//! from device-pixel conversion is corrected, not rejected), and re-encodes
//! the region as a PNG data URI.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;

use tabcap_core::geometry::PixelRect;
use tabcap_core::record::ImageRef;

/// Errors from decoding or cropping a screenshot.
#[derive(Debug, thiserror::Error)]
pub enum CropError {
    /// The image reference is not a base64 `data:` URI.
    #[error("image reference is not a base64 data URI")]
    InvalidDataUri,

    /// The crop source failed to decode, or the result failed to encode.
    #[error("failed to load crop source: {0}")]
    ImageLoad(#[from] image::ImageError),

    /// The rectangle covers no pixels once clamped into the source.
    #[error("crop region is empty after clamping to {width}x{height}")]
    EmptyRegion { width: u32, height: u32 },
}

/// Crop `source` to `rect`, returning a PNG data URI of exactly the clamped
/// rectangle's dimensions.
pub fn crop_image(source: &ImageRef, rect: PixelRect) -> Result<ImageRef, CropError> {
    let bytes = decode_data_uri(source)?;
    let image = image::load_from_memory(&bytes)?;

    let rect = rect.clamp_to(image.width(), image.height());
    if rect.is_empty() {
        return Err(CropError::EmptyRegion {
            width: image.width(),
            height: image.height(),
        });
    }
    tracing::debug!(
        source_width = image.width(),
        source_height = image.height(),
        ?rect,
        "cropping screenshot"
    );

    let cropped = image.crop_imm(rect.left, rect.top, rect.width, rect.height);
    let mut buffer = Vec::new();
    cropped.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(encode_png_data_uri(&buffer))
}

/// Extract the raw bytes from a `data:<mime>;base64,<payload>` reference.
pub fn decode_data_uri(image: &ImageRef) -> Result<Vec<u8>, CropError> {
    let payload = image
        .as_str()
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_mime, payload)| payload)
        .ok_or(CropError::InvalidDataUri)?;
    BASE64.decode(payload).map_err(|_| CropError::InvalidDataUri)
}

/// Wrap PNG bytes in a `data:image/png;base64,` reference.
pub fn encode_png_data_uri(bytes: &[u8]) -> ImageRef {
    ImageRef::new(format!("data:image/png;base64,{}", BASE64.encode(bytes)))
}
