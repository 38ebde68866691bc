use digrec::classifier::glyphs;
use digrec::{
    CentroidClassifier, Classifier, DecisionThresholds, Digit, LinearClassifier, PixelBuffer,
    PixelFormat,
};
use image::{GrayImage, Luma};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Canonical template for `digit` as a 28x28 buffer
pub fn template(digit: u8) -> PixelBuffer {
    let digit = Digit::new(digit).expect("digit in range");
    glyphs::template(digit, &PixelFormat::CANONICAL)
}

/// Empty 28x28 canvas
pub fn blank() -> PixelBuffer {
    PixelBuffer::blank(PixelFormat::CANONICAL)
}

/// Template for `digit` shifted right by `dx` pixels, with ink dimmed to `intensity`
pub fn shifted_template(digit: u8, dx: u32, intensity: f32) -> PixelBuffer {
    let source = template(digit);
    let format = PixelFormat::CANONICAL;
    let mut samples = vec![0.0; format.len()];
    for y in 0..format.height {
        for x in dx..format.width {
            let value = source.get(x - dx, y).unwrap_or(0.0);
            samples[(y * format.width + x) as usize] = value * intensity;
        }
    }
    PixelBuffer::from_samples(samples).expect("valid buffer")
}

/// Deterministic pseudo-random buffer in [0, 1]
pub fn noise(seed: u64) -> PixelBuffer {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let samples = (0..PixelFormat::CANONICAL.len())
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 40) as f32 / (1u64 << 24) as f32
        })
        .collect();
    PixelBuffer::from_samples(samples).expect("valid buffer")
}

/// A spread of well-formed buffers: blank, every template, shifted and dimmed variants, noise
pub fn sample_buffers() -> Vec<PixelBuffer> {
    let mut buffers = vec![blank()];
    for d in 0..=9 {
        buffers.push(template(d));
        buffers.push(shifted_template(d, 2, 0.6));
    }
    for seed in 0..5 {
        buffers.push(noise(seed));
    }
    buffers
}

/// Every strategy that works without external model files
pub fn model_free_classifiers() -> Vec<Arc<dyn Classifier>> {
    let format = PixelFormat::CANONICAL;
    let thresholds = DecisionThresholds::default();
    vec![
        Arc::new(CentroidClassifier::new()),
        Arc::new(
            LinearClassifier::from_templates(format, thresholds).expect("template weights"),
        ),
    ]
}

/// Writes a PNG of the glyph for `digit`, black on white, scaled by `scale`.
/// The file is removed when dropped.
pub fn create_digit_image(digit: u8, scale: u32) -> NamedTempFile {
    let source = template(digit);
    let img = GrayImage::from_fn(28 * scale, 28 * scale, |x, y| {
        let ink = source.get(x / scale, y / scale).unwrap_or(0.0);
        Luma([if ink > 0.5 { 0u8 } else { 255u8 }])
    });
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}
