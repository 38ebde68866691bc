use crate::classification::Classification;
use crate::classifier::{
    CentroidClassifier, Classifier, DecisionThresholds, LinearClassifier, OcrClassifier,
};
use crate::config::DigrecConfig;
use crate::error::{ClassifierError, Result};
use crate::pixels::PixelBuffer;
use std::sync::Arc;
use tracing::debug;

/// Named set of classifiers, in registration order
///
/// Hosts select a strategy by [`Classifier::name`]; nothing here depends on
/// a concrete strategy type.
#[derive(Clone, Default)]
pub struct ClassifierRegistry {
    classifiers: Vec<Arc<dyn Classifier>>,
}

impl ClassifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in strategy, configured from `config`
    pub fn with_builtin(config: &DigrecConfig) -> Result<Self> {
        config.validate()?;
        let format = config.pixels;
        let thresholds: DecisionThresholds = config.recognition.thresholds();

        let mut registry = Self::new();
        registry.register(Arc::new(CentroidClassifier::for_format(format, thresholds)?))?;
        let linear = match &config.linear.weights_path {
            Some(path) => LinearClassifier::from_file(format, thresholds, path),
            None => LinearClassifier::from_templates(format, thresholds)?,
        };
        registry.register(Arc::new(linear))?;
        registry.register(Arc::new(OcrClassifier::new(
            config.ocr.model_dir.clone(),
            format,
            thresholds,
        )))?;
        Ok(registry)
    }

    /// Add a classifier; names must be unique
    pub fn register(&mut self, classifier: Arc<dyn Classifier>) -> Result<()> {
        let name = classifier.name();
        if self.contains(name) {
            return Err(ClassifierError::DuplicateClassifier(name.to_string()));
        }
        debug!(classifier = name, "registered classifier");
        self.classifiers.push(classifier);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classifiers.iter().any(|c| c.name() == name)
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Classifier>> {
        self.classifiers
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .ok_or_else(|| ClassifierError::UnknownClassifier(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.classifiers.iter().map(|c| c.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Classifier>> {
        self.classifiers.iter()
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Look up a classifier by name and run it
    pub fn recognize_with(&self, name: &str, pixels: &PixelBuffer) -> Result<Classification> {
        self.get(name)?.recognize(pixels)
    }
}
