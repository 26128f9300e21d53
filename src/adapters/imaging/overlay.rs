use image::{Rgb, RgbImage};

use crate::adapters::imaging::codec::{decode_rgb, encode_jpeg, JPEG_QUALITY};
use crate::application::ports::FrameRendererPort;
use crate::domain::{
    detection::{BoundingBox, Detection},
    errors::{DomainError, DomainResult},
    scan::CapturedImage,
};

/// Paleta pastel de Halloween (calabaza, lavanda, chicle, índigo, menta).
pub const PALETTE: [Rgb<u8>; 5] = [
    Rgb([0xFF, 0xB3, 0x47]),
    Rgb([0xC3, 0xB1, 0xE1]),
    Rgb([0xE1, 0xA9, 0xD4]),
    Rgb([0x4B, 0x00, 0x82]),
    Rgb([0x98, 0xFB, 0x98]),
];

pub const BOX_THICKNESS: u32 = 3;

/// Mismo fantasma, mismo color.
pub fn color_for(label: &str) -> Rgb<u8> {
    let h = label
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
    PALETTE[h as usize % PALETTE.len()]
}

/// Dibuja el borde de la caja hacia adentro con el grosor indicado.
pub fn draw_box(img: &mut RgbImage, bbox: &BoundingBox, color: Rgb<u8>, thickness: u32) {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let x0 = (bbox.x_min.max(0) as u32).min(w - 1);
    let y0 = (bbox.y_min.max(0) as u32).min(h - 1);
    let x1 = (bbox.x_max.max(0) as u32).min(w - 1);
    let y1 = (bbox.y_max.max(0) as u32).min(h - 1);

    for t in 0..thickness {
        let (xx0, yy0) = (x0.saturating_add(t), y0.saturating_add(t));
        let (xx1, yy1) = (x1.saturating_sub(t), y1.saturating_sub(t));
        if xx0 > xx1 || yy0 > yy1 {
            break;
        }
        for x in xx0..=xx1 {
            img.put_pixel(x, yy0, color);
            img.put_pixel(x, yy1, color);
        }
        for y in yy0..=yy1 {
            img.put_pixel(xx0, y, color);
            img.put_pixel(xx1, y, color);
        }
    }
}

pub struct JpegOverlayRenderer {
    thickness: u32,
}

impl JpegOverlayRenderer {
    pub fn new() -> Self {
        Self { thickness: BOX_THICKNESS }
    }
}

impl Default for JpegOverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRendererPort for JpegOverlayRenderer {
    fn annotate(&self, image: &CapturedImage, detections: &[Detection], labels: &[String]) -> DomainResult<Vec<u8>> {
        let mut rgb = decode_rgb(&image.bytes)?;
        for (i, det) in detections.iter().enumerate() {
            let label = labels.get(i).map(String::as_str).unwrap_or(&det.original_label);
            draw_box(&mut rgb, &det.bbox, color_for(label), self.thickness);
        }
        encode_jpeg(&rgb, JPEG_QUALITY)
            .map_err(|e| DomainError::InvalidInput(format!("no se pudo codificar la escena: {e}")))
    }
}
