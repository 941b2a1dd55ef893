use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::photos::models::SizeVariantKind;

const THUMB_SIZE: u32 = 200;
const SMALL_HEIGHT: u32 = 360;
const MEDIUM_SIZE: u32 = 1080;

/// an encoded size variant, ready to be written to storage
pub struct RenderedVariant {
    pub kind: SizeVariantKind,
    pub width: u32,
    pub height: u32,
    /// jpeg bytes
    pub contents: Vec<u8>,
}

/// Renders every size variant the image is large enough for.
///
/// The thumb is always rendered. Every other kind is skipped if the original would have to be scaled up to fill it
pub fn render_variants(original: &DynamicImage) -> Result<Vec<RenderedVariant>, image::ImageError> {
    let mut rendered = Vec::new();
    for kind in SizeVariantKind::ALL {
        if let Some((width, height)) = target_size(kind, original.width(), original.height()) {
            let resized = match kind {
                SizeVariantKind::Thumb | SizeVariantKind::Thumb2x => {
                    original.resize_to_fill(width, height, FilterType::Lanczos3)
                }
                _ => original.resize_exact(width, height, FilterType::Lanczos3),
            };
            rendered.push(RenderedVariant {
                kind,
                width,
                height,
                contents: encode_jpeg(&resized)?,
            });
        }
    }
    Ok(rendered)
}

/// the dimensions a variant of `kind` would have for an original of `width` x `height`,
/// or `None` if the original is too small for it
pub fn target_size(kind: SizeVariantKind, width: u32, height: u32) -> Option<(u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let scale = if kind.is_2x() { 2 } else { 1 };
    match kind {
        SizeVariantKind::Thumb => Some((THUMB_SIZE, THUMB_SIZE)),
        SizeVariantKind::Thumb2x => {
            let size = THUMB_SIZE * scale;
            (width >= size && height >= size).then_some((size, size))
        }
        SizeVariantKind::Small | SizeVariantKind::Small2x => {
            let target_height = SMALL_HEIGHT * scale;
            (height > target_height).then(|| (scaled(width, target_height, height), target_height))
        }
        SizeVariantKind::Medium | SizeVariantKind::Medium2x => {
            let bound = MEDIUM_SIZE * scale;
            if width <= bound && height <= bound {
                return None;
            }
            if width >= height {
                Some((bound, scaled(height, bound, width)))
            } else {
                Some((scaled(width, bound, height), bound))
            }
        }
    }
}

/// `value * numerator / denominator`, rounded and never below 1
fn scaled(value: u32, numerator: u32, denominator: u32) -> u32 {
    let result = (u64::from(value) * u64::from(numerator) + u64::from(denominator) / 2)
        / u64::from(denominator);
    result.max(1) as u32
}

fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    // jpeg has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut blob = Vec::<u8>::new();
    rgb.write_to(&mut Cursor::new(&mut blob), ImageFormat::Jpeg)?;
    Ok(blob)
}
