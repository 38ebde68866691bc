pub mod centroid;
pub mod glyphs;
pub mod linear;
pub mod ocr;

pub use centroid::CentroidClassifier;
pub use linear::LinearClassifier;
pub use ocr::OcrClassifier;

use crate::classification::Classification;
use crate::error::Result;
use crate::pixels::{PixelBuffer, PixelFormat};

/// Trait that all recognition strategies must implement
///
/// Callers hold a `dyn Classifier` and never depend on a concrete strategy.
/// `recognize` takes `&self`: state established at construction is never
/// altered by a call, so one instance can serve concurrent callers.
pub trait Classifier: Send + Sync {
    /// Stable identifier, usable as a selection key
    fn name(&self) -> &str;

    /// Classify one buffer.
    ///
    /// Fails with `InvalidInput` when the buffer does not match
    /// [`pixel_format`](Classifier::pixel_format), and with `NotReady` when the
    /// strategy's backing resources are missing. A considered but uncertain
    /// answer is returned as [`Label::Unrecognized`](crate::Label::Unrecognized).
    fn recognize(&self, pixels: &PixelBuffer) -> Result<Classification>;

    /// Format of the buffers this classifier accepts
    fn pixel_format(&self) -> PixelFormat {
        PixelFormat::CANONICAL
    }
}

/// Limits below which a strategy answers with the unrecognized sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionThresholds {
    /// Minimum score/probability for the best digit to be reported
    pub acceptance: f32,
    /// Minimum ink coverage; anything below is treated as a blank canvas
    pub min_ink: f32,
}

impl DecisionThresholds {
    pub fn new(acceptance: f32, min_ink: f32) -> Self {
        Self { acceptance, min_ink }
    }

    /// Whether samples already normalized to [0, 1] hold too little ink to classify
    pub fn is_blank(&self, normalized: &[f32]) -> bool {
        if normalized.is_empty() {
            return true;
        }
        let coverage = normalized.iter().sum::<f32>() / normalized.len() as f32;
        coverage < self.min_ink
    }
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            acceptance: 0.35,
            min_ink: 0.01,
        }
    }
}
