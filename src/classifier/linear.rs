use super::{Classifier, DecisionThresholds, glyphs};
use crate::classification::{Candidate, Classification, Digit};
use crate::error::{ClassifierError, Result};
use crate::pixels::{PixelBuffer, PixelFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Sharpness applied to template-derived logits before softmax
const TEMPLATE_LOGIT_SCALE: f32 = 20.0;

/// Weights of a ten-class linear model, one row per digit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearWeights {
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

impl LinearWeights {
    fn validate(&self, format: &PixelFormat) -> Result<()> {
        if self.weights.len() != Digit::ALL.len() || self.bias.len() != Digit::ALL.len() {
            return Err(ClassifierError::Config(format!(
                "linear model needs {} weight rows and biases, got {} and {}",
                Digit::ALL.len(),
                self.weights.len(),
                self.bias.len()
            )));
        }
        for (digit, row) in self.weights.iter().enumerate() {
            if row.len() != format.len() {
                return Err(ClassifierError::Config(format!(
                    "weight row {} has {} entries, expected {}",
                    digit,
                    row.len(),
                    format.len()
                )));
            }
        }
        let all_finite = self
            .weights
            .iter()
            .flatten()
            .chain(&self.bias)
            .all(|w| w.is_finite());
        if !all_finite {
            return Err(ClassifierError::Config(
                "linear model contains non-finite weights".to_string(),
            ));
        }
        Ok(())
    }
}

/// Linear model with softmax output.
///
/// Confidence is the top softmax probability. A classifier whose weights
/// could not be loaded still constructs, but every `recognize` call fails
/// with `NotReady` instead of guessing.
pub struct LinearClassifier {
    format: PixelFormat,
    thresholds: DecisionThresholds,
    model: std::result::Result<LinearWeights, String>,
}

impl LinearClassifier {
    pub const NAME: &'static str = "linear-softmax";

    pub fn new(
        format: PixelFormat,
        thresholds: DecisionThresholds,
        weights: LinearWeights,
    ) -> Result<Self> {
        format.validate()?;
        weights.validate(&format)?;
        Ok(Self {
            format,
            thresholds,
            model: Ok(weights),
        })
    }

    /// Model derived from the built-in glyph templates.
    ///
    /// Each row rewards ink inside its template and penalizes ink outside
    /// it, so an exact template always has the highest logit.
    pub fn from_templates(format: PixelFormat, thresholds: DecisionThresholds) -> Result<Self> {
        format.validate()?;
        let mut weights = Vec::with_capacity(Digit::ALL.len());
        for (_, template) in glyphs::all_templates(&format) {
            let t: Vec<f32> = template.normalized().collect();
            let ink: f32 = t.iter().sum();
            let background = t.len() as f32 - ink;
            let row = t
                .iter()
                .map(|&v| {
                    let inside = if ink > 0.0 { v / ink } else { 0.0 };
                    let outside = if background > 0.0 { (1.0 - v) / background } else { 0.0 };
                    TEMPLATE_LOGIT_SCALE * (inside - outside)
                })
                .collect();
            weights.push(row);
        }
        Self::new(
            format,
            thresholds,
            LinearWeights {
                weights,
                bias: vec![0.0; Digit::ALL.len()],
            },
        )
    }

    /// Load weights from a JSON file, failing on any read or shape error
    pub fn try_from_file(
        format: PixelFormat,
        thresholds: DecisionThresholds,
        path: &Path,
    ) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let weights: LinearWeights = serde_json::from_str(&content).map_err(|e| {
            ClassifierError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Self::new(format, thresholds, weights)
    }

    /// Load weights from a JSON file; on failure the classifier reports `NotReady`
    pub fn from_file(format: PixelFormat, thresholds: DecisionThresholds, path: &Path) -> Self {
        match Self::try_from_file(format, thresholds, path) {
            Ok(classifier) => classifier,
            Err(e) => {
                warn!(classifier = Self::NAME, path = %path.display(), error = %e, "model unavailable");
                Self::unavailable(format, thresholds, e.to_string())
            }
        }
    }

    /// Classifier with no model; every call fails with `NotReady`
    pub fn unavailable(
        format: PixelFormat,
        thresholds: DecisionThresholds,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            format,
            thresholds,
            model: Err(reason.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_ok()
    }
}

impl Classifier for LinearClassifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn recognize(&self, pixels: &PixelBuffer) -> Result<Classification> {
        pixels.validate_for(&self.format)?;
        let model = self
            .model
            .as_ref()
            .map_err(|reason| ClassifierError::not_ready(Self::NAME, reason.clone()))?;

        let input: Vec<f32> = pixels
            .samples()
            .iter()
            .map(|&v| self.format.normalize(v))
            .collect();
        if self.thresholds.is_blank(&input) {
            debug!(classifier = Self::NAME, "blank canvas");
            return Ok(Classification::unrecognized(0.0));
        }

        let logits: Vec<f32> = model
            .weights
            .iter()
            .zip(&model.bias)
            .map(|(row, b)| row.iter().zip(&input).map(|(w, x)| w * x).sum::<f32>() + b)
            .collect();
        let probabilities = softmax(&logits);

        let candidates: Vec<Candidate> = Digit::ALL
            .iter()
            .zip(&probabilities)
            .map(|(&d, &p)| Candidate::new(d, p))
            .collect();
        let best = candidates
            .iter()
            .copied()
            .max_by(|a, b| a.score.total_cmp(&b.score).then(b.digit.cmp(&a.digit)));

        let classification = match best {
            Some(c) if c.score >= self.thresholds.acceptance => {
                Classification::digit(c.digit, c.score)
            }
            Some(c) => Classification::unrecognized(c.score),
            None => Classification::unrecognized(0.0),
        };
        debug!(
            classifier = Self::NAME,
            label = %classification.label(),
            confidence = ?classification.confidence(),
            "recognized"
        );

        Ok(classification.with_alternatives(candidates))
    }

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}
