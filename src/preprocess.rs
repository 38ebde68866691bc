//! Conversion between images and pixel buffers.
//!
//! Host applications usually hold a scanned or drawn image with dark ink on a
//! light background. [`image_to_pixels`] turns that into a normalized
//! [`PixelBuffer`]: grayscale, optional blur, crop to content, aspect-preserving
//! resize centered on the canvas, then inversion so ink maps to the top of the
//! format's range.

use crate::error::{ClassifierError, Result};
use crate::pixels::{PixelBuffer, PixelFormat};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;

const WHITE: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreprocessOptions {
    /// Gaussian blur applied before cropping; `None` disables it
    pub blur_sigma: Option<f32>,
    /// Gray levels below this count as ink when locating content
    pub ink_threshold: u8,
    /// Share of the canvas the content box may occupy (20 of 28 pixels by default)
    pub content_fraction: f32,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            blur_sigma: Some(0.5),
            ink_threshold: 250,
            content_fraction: 20.0 / 28.0,
        }
    }
}

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Bounding box `(x, y, width, height)` of pixels darker than `threshold`
pub fn content_bounds(gray: &GrayImage, threshold: u8) -> Option<(u32, u32, u32, u32)> {
    let (width, height) = gray.dimensions();
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;
    let mut has_content = false;

    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel[0] < threshold {
            has_content = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    has_content.then(|| (min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Scale `content` to fit a `box_w` x `box_h` box, centered on a white canvas
fn fit_to_canvas(
    content: &GrayImage,
    canvas_w: u32,
    canvas_h: u32,
    box_w: u32,
    box_h: u32,
) -> GrayImage {
    let (content_w, content_h) = content.dimensions();
    let scale = (box_w as f32 / content_w as f32).min(box_h as f32 / content_h as f32);
    let scaled_w = ((content_w as f32 * scale).round() as u32).clamp(1, canvas_w);
    let scaled_h = ((content_h as f32 * scale).round() as u32).clamp(1, canvas_h);

    let scaled = image::imageops::resize(content, scaled_w, scaled_h, FilterType::CatmullRom);

    let mut canvas = GrayImage::from_pixel(canvas_w, canvas_h, Luma([WHITE]));
    let offset_x = (canvas_w - scaled_w) / 2;
    let offset_y = (canvas_h - scaled_h) / 2;
    image::imageops::overlay(&mut canvas, &scaled, offset_x.into(), offset_y.into());
    canvas
}

/// Normalize an image of dark ink on a light background into a pixel buffer
pub fn image_to_pixels(
    img: &DynamicImage,
    format: PixelFormat,
    options: &PreprocessOptions,
) -> Result<PixelBuffer> {
    format.validate()?;
    if img.width() == 0 || img.height() == 0 {
        return Err(ClassifierError::invalid_input(format!(
            "image dimensions must be positive, got {}x{}",
            img.width(),
            img.height()
        )));
    }

    let mut gray = to_grayscale(img);
    if let Some(sigma) = options.blur_sigma.filter(|s| *s > 0.0) {
        gray = apply_blur(&gray, sigma);
    }

    let Some((x, y, w, h)) = content_bounds(&gray, options.ink_threshold) else {
        return Ok(PixelBuffer::blank(format));
    };
    let cropped = image::imageops::crop_imm(&gray, x, y, w, h).to_image();

    let fraction = options.content_fraction.clamp(0.05, 1.0);
    let box_w = ((format.width as f32 * fraction).round() as u32).max(1);
    let box_h = ((format.height as f32 * fraction).round() as u32).max(1);
    let canvas = fit_to_canvas(&cropped, format.width, format.height, box_w, box_h);

    let span = format.max_value - format.min_value;
    let samples = canvas
        .pixels()
        .map(|p| {
            let ink = 1.0 - p[0] as f32 / WHITE as f32;
            (format.min_value + ink * span).clamp(format.min_value, format.max_value)
        })
        .collect();

    PixelBuffer::new(format, samples)
}

/// Render a buffer as dark ink on a white background
pub fn pixels_to_image(pixels: &PixelBuffer) -> GrayImage {
    let format = *pixels.format();
    GrayImage::from_fn(format.width, format.height, |x, y| {
        let ink = format.normalize(pixels.get(x, y).unwrap_or(format.min_value));
        Luma([(WHITE as f32 * (1.0 - ink)).round() as u8])
    })
}

/// Render a buffer upscaled onto a square white canvas with a margin, for OCR engines
/// that expect text larger than a 28x28 glyph
pub fn render_for_ocr(pixels: &PixelBuffer, target_size: u32) -> GrayImage {
    let gray = pixels_to_image(pixels);
    let border = (target_size / 10).max(1);
    let inner = target_size.saturating_sub(2 * border).max(1);

    match content_bounds(&gray, WHITE) {
        Some((x, y, w, h)) => {
            let cropped = image::imageops::crop_imm(&gray, x, y, w, h).to_image();
            fit_to_canvas(&cropped, target_size, target_size, inner, inner)
        }
        None => GrayImage::from_pixel(target_size, target_size, Luma([WHITE])),
    }
}
