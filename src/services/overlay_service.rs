use crate::services::exif_service;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// Burn the mask into the original the way the webview shows it: multiply
/// blend at `opacity`, so flood pixels (white) keep the original colour and
/// everything else darkens.
///
/// The original is rotated per its EXIF orientation first; the mask is
/// stretched to the original's size with nearest-neighbour sampling.
pub fn compose_overlay(
    original: &[u8],
    orientation: u32,
    mask_png: &[u8],
    opacity: f32,
) -> Result<RgbaImage, image::ImageError> {
    let base = image::load_from_memory(original)?;
    let base = exif_service::apply_orientation(base, orientation).into_rgba8();
    let (width, height) = base.dimensions();

    let mask = image::load_from_memory(mask_png)?.into_luma8();
    let mask = if mask.dimensions() == (width, height) {
        mask
    } else {
        image::imageops::resize(&mask, width, height, FilterType::Nearest)
    };

    let alpha = opacity.clamp(0.0, 1.0);
    let mut out = base;
    for (pixel, m) in out.pixels_mut().zip(mask.pixels()) {
        let factor = 1.0 - alpha + alpha * (m[0] as f32 / 255.0);
        for channel in pixel.0.iter_mut().take(3) {
            *channel = (*channel as f32 * factor).round().clamp(0.0, 255.0) as u8;
        }
    }

    Ok(out)
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut png_bytes = Vec::with_capacity((img.width() * img.height()) as usize);
    PngEncoder::new_with_quality(&mut png_bytes, CompressionType::Fast, PngFilter::Adaptive)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)?;
    Ok(png_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode(img: DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn flood_pixels_keep_colour_and_dry_pixels_darken() {
        let original = encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            4,
            4,
            Rgb([200, 100, 50]),
        )));
        // Left half flooded, 2x2 mask stretched to 4x4.
        let mask = encode(DynamicImage::ImageLuma8(GrayImage::from_fn(2, 2, |x, _| {
            if x == 0 {
                Luma([255])
            } else {
                Luma([0])
            }
        })));

        let out = compose_overlay(&original, 1, &mask, 0.5).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.get_pixel(0, 0).0, [200, 100, 50, 255]);
        assert_eq!(out.get_pixel(3, 3).0, [100, 50, 25, 255]);
    }

    #[test]
    fn zero_opacity_leaves_original_untouched() {
        let original = encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            3,
            2,
            Rgb([10, 20, 30]),
        )));
        let mask = encode(DynamicImage::ImageLuma8(GrayImage::new(3, 2)));

        let out = compose_overlay(&original, 1, &mask, 0.0).unwrap();
        assert!(out.pixels().all(|p| p.0 == [10, 20, 30, 255]));
    }

    #[test]
    fn encoded_overlay_is_png() {
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let bytes = encode_png(&img).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn rotated_original_sets_output_size() {
        let original = encode(DynamicImage::ImageRgb8(RgbImage::new(6, 2)));
        let mask = encode(DynamicImage::ImageLuma8(GrayImage::new(4, 4)));
        let out = compose_overlay(&original, 6, &mask, 0.5).unwrap();
        assert_eq!(out.dimensions(), (2, 6));
    }
}
