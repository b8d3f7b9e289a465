//! Fixed-aspect crop applied to single-image categories before upload.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::{
    error::CropError,
    media::{AspectRatio, LocalFile},
};

/// Pixel rectangle picked by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropArea {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Crops `file` to `aspect` and re-encodes it as JPEG.
///
/// Without an `area` the largest centered rectangle is used. A given area is
/// clipped to the image and shrunk along its longer side to match the aspect.
pub fn crop_to_aspect(
    file: &LocalFile,
    aspect: AspectRatio,
    area: Option<CropArea>,
) -> Result<LocalFile, CropError> {
    let decoded = image::load_from_memory(&file.bytes).map_err(|err| CropError::Decode {
        filename: file.filename.clone(),
        reason: err.to_string(),
    })?;
    let (width, height) = decoded.dimensions();
    let area = match area {
        Some(area) => fit_area(area, aspect, width, height)?,
        None => centered_area(aspect, width, height),
    };

    let cropped = decoded.crop_imm(area.x, area.y, area.width, area.height);
    let rgb = DynamicImage::ImageRgb8(cropped.to_rgb8());
    let mut encoded = Cursor::new(Vec::new());
    rgb.write_to(&mut encoded, ImageFormat::Jpeg)
        .map_err(|err| CropError::Encode {
            filename: file.filename.clone(),
            reason: err.to_string(),
        })?;

    Ok(LocalFile {
        id: file.id,
        filename: jpeg_filename(&file.filename),
        content_type: "image/jpeg".to_string(),
        bytes: encoded.into_inner().into(),
        cropped: true,
    })
}

/// `logo.png` becomes `logo.jpg`; a name without extension gains one.
fn jpeg_filename(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{stem}.jpg"),
        _ => format!("{name}.jpg"),
    }
}

fn snap(width: u32, height: u32, aspect: AspectRatio) -> (u32, u32) {
    let (aw, ah) = (u64::from(aspect.width), u64::from(aspect.height));
    let (w, h) = (u64::from(width), u64::from(height));
    let (w, h) = if w * ah > h * aw {
        (h * aw / ah, h)
    } else {
        (w, w * ah / aw)
    };
    (
        u32::try_from(w).unwrap_or(width).max(1),
        u32::try_from(h).unwrap_or(height).max(1),
    )
}

fn centered_area(aspect: AspectRatio, width: u32, height: u32) -> CropArea {
    let (crop_width, crop_height) = snap(width, height, aspect);
    CropArea {
        x: (width - crop_width.min(width)) / 2,
        y: (height - crop_height.min(height)) / 2,
        width: crop_width.min(width),
        height: crop_height.min(height),
    }
}

fn fit_area(
    area: CropArea,
    aspect: AspectRatio,
    width: u32,
    height: u32,
) -> Result<CropArea, CropError> {
    if area.x >= width || area.y >= height || area.width == 0 || area.height == 0 {
        return Err(CropError::AreaOutOfBounds { width, height });
    }
    let clipped_width = area.width.min(width - area.x);
    let clipped_height = area.height.min(height - area.y);
    let (crop_width, crop_height) = snap(clipped_width, clipped_height, aspect);
    Ok(CropArea {
        x: area.x,
        y: area.y,
        width: crop_width.min(clipped_width),
        height: crop_height.min(clipped_height),
    })
}
