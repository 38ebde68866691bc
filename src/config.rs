//! Configuration loading.
//!
//! Resolution order:
//! 1. Path given on the command line
//! 2. Path in the `DIGREC_CONFIG` environment variable
//! 3. Compiled defaults
//!
//! Every section and field is optional in the TOML file:
//!
//! ```toml
//! [pixels]
//! width = 28
//! height = 28
//! min_value = 0.0
//! max_value = 1.0
//!
//! [recognition]
//! default_classifier = "reference-centroid"
//! acceptance_threshold = 0.35
//! min_ink = 0.01
//!
//! [linear]
//! weights_path = "weights.json"
//!
//! [ocr]
//! model_dir = "/home/me/.cache/ocrs"
//! ```

use crate::classifier::{CentroidClassifier, DecisionThresholds};
use crate::error::{ClassifierError, Result};
use crate::pixels::PixelFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_ENV_VAR: &str = "DIGREC_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DigrecConfig {
    pub pixels: PixelFormat,
    pub recognition: RecognitionConfig,
    pub linear: LinearConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Classifier used when the caller does not name one
    pub default_classifier: String,
    pub acceptance_threshold: f32,
    pub min_ink: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    /// JSON weights for the linear strategy; template-derived weights when unset
    pub weights_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory holding the ocrs `.rten` models; `~/.cache/ocrs` when unset
    pub model_dir: Option<PathBuf>,
}

impl Default for DigrecConfig {
    fn default() -> Self {
        Self {
            pixels: PixelFormat::CANONICAL,
            recognition: RecognitionConfig::default(),
            linear: LinearConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        let thresholds = DecisionThresholds::default();
        Self {
            default_classifier: CentroidClassifier::NAME.to_string(),
            acceptance_threshold: thresholds.acceptance,
            min_ink: thresholds.min_ink,
        }
    }
}

impl RecognitionConfig {
    pub fn thresholds(&self) -> DecisionThresholds {
        DecisionThresholds::new(self.acceptance_threshold, self.min_ink)
    }
}

impl DigrecConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DigrecConfig = toml::from_str(content)
            .map_err(|e| ClassifierError::Config(format!("invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve configuration from the CLI argument, the environment, or defaults
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_arg {
            debug!(path = %path.display(), "loading config from command line");
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            debug!(path = %path, "loading config from {}", CONFIG_ENV_VAR);
            return Self::load(Path::new(&path));
        }

        debug!("using default config");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        self.pixels.validate()?;

        let unit = 0.0f32..=1.0;
        if !unit.contains(&self.recognition.acceptance_threshold) {
            return Err(ClassifierError::Config(format!(
                "acceptance_threshold must be in [0, 1], got {}",
                self.recognition.acceptance_threshold
            )));
        }
        if !unit.contains(&self.recognition.min_ink) {
            return Err(ClassifierError::Config(format!(
                "min_ink must be in [0, 1], got {}",
                self.recognition.min_ink
            )));
        }
        if self.recognition.default_classifier.trim().is_empty() {
            return Err(ClassifierError::Config(
                "default_classifier must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = DigrecConfig::from_toml_str("").unwrap();
        assert_eq!(config, DigrecConfig::default());
        assert_eq!(config.pixels.len(), 784);
        assert_eq!(config.recognition.default_classifier, "reference-centroid");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DigrecConfig::from_toml_str(
            r#"
            [pixels]
            width = 16
            height = 16

            [recognition]
            acceptance_threshold = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.pixels.len(), 256);
        assert_eq!(config.pixels.max_value, 1.0);
        assert_eq!(config.recognition.acceptance_threshold, 0.5);
        assert_eq!(config.recognition.min_ink, 0.01);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let err = DigrecConfig::from_toml_str("[recognition]\nacceptance_threshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("acceptance_threshold"));
    }

    #[test]
    fn inverted_pixel_range_is_rejected() {
        let err =
            DigrecConfig::from_toml_str("[pixels]\nmin_value = 1.0\nmax_value = 0.0").unwrap_err();
        assert!(matches!(err, ClassifierError::Config(_)));
    }
}
