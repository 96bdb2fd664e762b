use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

/// Re-encode quality for the buffer handed to the OCR engine.
const JPEG_QUALITY: u8 = 95;

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("failed to decode slip image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("crop region has zero area")]
    InvalidCrop,
    #[error("failed to encode prepared image: {0}")]
    Encode(String),
}

/// A rectangle selected on the *displayed* image, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A crop plus the display dimensions it was selected against. The display
/// is usually scaled down for on-screen editing while the decoded image
/// keeps its natural resolution, so coordinates must be rescaled before any
/// pixels are touched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropSelection {
    pub region: CropRegion,
    pub display_width: f64,
    pub display_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelRect {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

/// Decode a slip image and return the buffer to feed the OCR engine:
/// the crop (if any) rescaled to natural resolution, re-encoded as JPEG.
/// The source bytes are never modified.
pub fn prepare_slip(data: &[u8], crop: Option<&CropSelection>) -> Result<Vec<u8>, PrepareError> {
    let img = image::load_from_memory(data)?;
    let prepared = match crop {
        Some(sel) => {
            let r = to_natural_pixels(sel, img.width(), img.height())?;
            img.crop_imm(r.x, r.y, r.width, r.height)
        }
        None => img,
    };
    encode_jpeg(&prepared)
}

/// Rescale a display-space selection to natural pixel space. Regions hanging
/// past the image edge are clamped; zero-area results are an error the
/// caller handles by falling back to the full image.
fn to_natural_pixels(
    sel: &CropSelection,
    natural_w: u32,
    natural_h: u32,
) -> Result<PixelRect, PrepareError> {
    if sel.display_width <= 0.0 || sel.display_height <= 0.0 {
        return Err(PrepareError::InvalidCrop);
    }
    let sx = natural_w as f64 / sel.display_width;
    let sy = natural_h as f64 / sel.display_height;

    let x = ((sel.region.x.max(0.0) * sx).round() as u32).min(natural_w);
    let y = ((sel.region.y.max(0.0) * sy).round() as u32).min(natural_h);
    let width = ((sel.region.width.max(0.0) * sx).round() as u32).min(natural_w - x);
    let height = ((sel.region.height.max(0.0) * sy).round() as u32).min(natural_h - y);

    if width == 0 || height == 0 {
        return Err(PrepareError::InvalidCrop);
    }
    Ok(PixelRect { x, y, width, height })
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, PrepareError> {
    // JPEG has no alpha channel; flatten before encoding.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)
        .map_err(|e| PrepareError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}
