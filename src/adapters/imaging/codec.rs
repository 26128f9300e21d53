use anyhow::Result;
use image::RgbImage;

use crate::domain::errors::{DomainError, DomainResult};

pub const JPEG_QUALITY: u8 = 85;

/// Decodifica los bytes de la cámara (JPEG/PNG) a RGB.
pub fn decode_rgb(bytes: &[u8]) -> DomainResult<RgbImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| DomainError::InvalidInput(format!("imagen ilegible: {e}")))?;
    Ok(img.to_rgb8())
}

pub fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut jpeg = Vec::new();
    let mut enc = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, quality);
    enc.encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ExtendedColorType::Rgb8)?;
    Ok(jpeg)
}
