//! Pixel buffer contract shared by every classifier.
//!
//! A [`PixelBuffer`] is the normalized, fixed-length grayscale image handed to
//! [`Classifier::recognize`](crate::Classifier::recognize). Buffers built through
//! [`PixelBuffer::new`] are validated at creation; classifiers validate again
//! against their own [`PixelFormat`] so a buffer built for another format is
//! rejected at the boundary instead of deep inside a strategy.

use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};

/// Dimensions and value range agreed between the producer of a buffer and a classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelFormat {
    pub width: u32,
    pub height: u32,
    pub min_value: f32,
    pub max_value: f32,
}

/// Largest width or height a format may declare
pub const MAX_DIMENSION: u32 = 4096;

impl PixelFormat {
    /// 28x28 grayscale, 0.0 = background, 1.0 = full ink
    pub const CANONICAL: PixelFormat = PixelFormat {
        width: 28,
        height: 28,
        min_value: 0.0,
        max_value: 1.0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::CANONICAL
        }
    }

    pub fn with_range(mut self, min_value: f32, max_value: f32) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    /// Number of samples a buffer of this format holds
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check the format itself is usable
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ClassifierError::Config(format!(
                "pixel format dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(ClassifierError::Config(format!(
                "pixel format dimensions must be at most {}, got {}x{}",
                MAX_DIMENSION, self.width, self.height
            )));
        }
        if !self.min_value.is_finite() || !self.max_value.is_finite() {
            return Err(ClassifierError::Config(format!(
                "pixel format range must be finite, got [{}, {}]",
                self.min_value, self.max_value
            )));
        }
        if self.min_value >= self.max_value {
            return Err(ClassifierError::Config(format!(
                "pixel format range is empty: [{}, {}]",
                self.min_value, self.max_value
            )));
        }
        Ok(())
    }

    /// Map a raw sample into [0, 1] relative to this format's range
    pub fn normalize(&self, value: f32) -> f32 {
        ((value - self.min_value) / (self.max_value - self.min_value)).clamp(0.0, 1.0)
    }
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// Immutable grayscale digit image
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    format: PixelFormat,
    samples: Vec<f32>,
}

impl PixelBuffer {
    /// Build a validated buffer; fails with `InvalidInput` on a length or range violation
    pub fn new(format: PixelFormat, samples: Vec<f32>) -> Result<Self> {
        validate_samples(&samples, &format)?;
        Ok(Self { format, samples })
    }

    /// Build a validated buffer in the canonical 28x28 format
    pub fn from_samples(samples: Vec<f32>) -> Result<Self> {
        Self::new(PixelFormat::CANONICAL, samples)
    }

    /// Wrap samples without validation.
    ///
    /// For hosts that forward data from an untrusted boundary and rely on the
    /// classifier to reject it. `recognize` always re-validates.
    pub fn new_unchecked(format: PixelFormat, samples: Vec<f32>) -> Self {
        Self { format, samples }
    }

    /// All-background buffer, i.e. an empty canvas
    pub fn blank(format: PixelFormat) -> Self {
        Self {
            format,
            samples: vec![format.min_value; format.len()],
        }
    }

    pub fn format(&self) -> &PixelFormat {
        &self.format
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at column `x`, row `y`
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.format.width || y >= self.format.height {
            return None;
        }
        self.samples
            .get(y as usize * self.format.width as usize + x as usize)
            .copied()
    }

    /// Samples rescaled to [0, 1] relative to the buffer's format
    pub fn normalized(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().map(|&v| self.format.normalize(v))
    }

    /// Fraction of the canvas covered by ink, in [0, 1]
    pub fn ink_coverage(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.normalized().sum::<f32>() / self.samples.len() as f32
    }

    /// Check this buffer against the format a classifier expects.
    ///
    /// The buffer's own format must be the same one: equal length alone is
    /// not enough, since shape and range decide how samples are read.
    pub fn validate_for(&self, format: &PixelFormat) -> Result<()> {
        if self.format != *format {
            return Err(ClassifierError::invalid_input(format!(
                "pixel buffer is {}x{} in [{}, {}], classifier expects {}x{} in [{}, {}]",
                self.format.width,
                self.format.height,
                self.format.min_value,
                self.format.max_value,
                format.width,
                format.height,
                format.min_value,
                format.max_value
            )));
        }
        validate_samples(&self.samples, format)
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

fn validate_samples(samples: &[f32], format: &PixelFormat) -> Result<()> {
    if samples.len() != format.len() {
        return Err(ClassifierError::invalid_input(format!(
            "pixel buffer must hold {} samples ({}x{}), got {}",
            format.len(),
            format.width,
            format.height,
            samples.len()
        )));
    }

    for (i, &value) in samples.iter().enumerate() {
        if !value.is_finite() {
            return Err(ClassifierError::invalid_input(format!(
                "sample {} must be finite, got: {}",
                i, value
            )));
        }
        if value < format.min_value || value > format.max_value {
            return Err(ClassifierError::invalid_input(format!(
                "sample {} must be in range [{}, {}], got: {}",
                i, format.min_value, format.max_value, value
            )));
        }
    }

    Ok(())
}
