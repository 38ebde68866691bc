use super::{Classifier, DecisionThresholds, glyphs};
use crate::classification::{Candidate, Classification, Digit};
use crate::error::{ClassifierError, Result};
use crate::pixels::{PixelBuffer, PixelFormat};
use tracing::{debug, trace};

/// Nearest-template matcher.
///
/// Scores every stored template with the weighted Jaccard similarity
/// `sum(min(a, b)) / sum(max(a, b))` over normalized samples, so an exact
/// template match scores 1.0 and a blank canvas scores 0.0. A digit may have
/// several templates; its score is the best of them. Stateless after
/// construction and safe to share between threads.
pub struct CentroidClassifier {
    format: PixelFormat,
    thresholds: DecisionThresholds,
    /// Normalized template samples per digit
    templates: Vec<(Digit, Vec<f32>)>,
}

impl CentroidClassifier {
    pub const NAME: &'static str = "reference-centroid";

    /// Classifier over the built-in glyph templates in the canonical format
    pub fn new() -> Self {
        Self::from_glyphs(PixelFormat::CANONICAL, DecisionThresholds::default())
    }

    /// Classifier over the built-in glyph templates rendered for `format`
    pub fn for_format(format: PixelFormat, thresholds: DecisionThresholds) -> Result<Self> {
        format.validate()?;
        Ok(Self::from_glyphs(format, thresholds))
    }

    fn from_glyphs(format: PixelFormat, thresholds: DecisionThresholds) -> Self {
        let templates = glyphs::all_templates(&format)
            .into_iter()
            .map(|(digit, t)| (digit, t.normalized().collect()))
            .collect();
        Self {
            format,
            thresholds,
            templates,
        }
    }

    /// Classifier over caller-supplied templates
    pub fn with_templates(
        format: PixelFormat,
        thresholds: DecisionThresholds,
        templates: Vec<(Digit, PixelBuffer)>,
    ) -> Result<Self> {
        format.validate()?;
        if templates.is_empty() {
            return Err(ClassifierError::Config(
                "centroid classifier needs at least one template".to_string(),
            ));
        }

        let mut normalized = Vec::with_capacity(templates.len());
        for (digit, t) in templates {
            t.validate_for(&format).map_err(|e| {
                ClassifierError::Config(format!("template for digit {}: {}", digit, e))
            })?;
            normalized.push((digit, t.normalized().collect()));
        }

        Ok(Self {
            format,
            thresholds,
            templates: normalized,
        })
    }

    pub fn thresholds(&self) -> DecisionThresholds {
        self.thresholds
    }

    /// Best score per digit, for digits that have at least one template
    fn score_digits(&self, input: &[f32]) -> Vec<Candidate> {
        let mut best: [Option<f32>; 10] = [None; 10];
        for (digit, template) in &self.templates {
            let score = weighted_jaccard(input, template);
            let slot = &mut best[digit.index()];
            *slot = Some(slot.map_or(score, |s: f32| s.max(score)));
        }

        Digit::ALL
            .iter()
            .filter_map(|&d| best[d.index()].map(|score| Candidate::new(d, score)))
            .collect()
    }
}

impl Default for CentroidClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for CentroidClassifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn recognize(&self, pixels: &PixelBuffer) -> Result<Classification> {
        pixels.validate_for(&self.format)?;

        let input: Vec<f32> = pixels
            .samples()
            .iter()
            .map(|&v| self.format.normalize(v))
            .collect();
        if self.thresholds.is_blank(&input) {
            debug!(classifier = Self::NAME, "blank canvas");
            return Ok(Classification::unrecognized(0.0));
        }

        let candidates = self.score_digits(&input);
        trace!(classifier = Self::NAME, ?candidates, "template scores");

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

fn weighted_jaccard(a: &[f32], b: &[f32]) -> f32 {
    let (mut min_sum, mut max_sum) = (0.0f32, 0.0f32);
    for (&x, &y) in a.iter().zip(b) {
        min_sum += x.min(y);
        max_sum += x.max(y);
    }
    if max_sum == 0.0 { 0.0 } else { min_sum / max_sum }
}
