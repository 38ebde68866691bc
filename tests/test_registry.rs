//! Integration tests for classifier selection by name.
//!
//! Tests cover:
//! - Built-in strategies and their registration order
//! - Duplicate and unknown names
//! - Dispatch to caller-defined strategies
//! - Linear weights loaded from a configured file

mod common;

use std::io::Write;
use std::sync::Arc;

use common::*;

/// Caller-defined strategy that always answers with one digit
struct FixedDigit {
    digit: Digit,
}

impl Classifier for FixedDigit {
    fn name(&self) -> &str {
        "fixed-digit"
    }

    fn recognize(&self, pixels: &PixelBuffer) -> digrec::Result<Classification> {
        pixels.validate_for(&self.pixel_format())?;
        Ok(Classification::digit(self.digit, 0.5))
    }
}

#[test]
fn test_builtin_registry_lists_all_strategies() -> anyhow::Result<()> {
    let registry = ClassifierRegistry::with_builtin(&DigrecConfig::default())?;

    assert_eq!(
        registry.names(),
        vec!["reference-centroid", "linear-softmax", "ocrs"]
    );
    assert_eq!(registry.len(), 3);
    assert!(registry.contains("ocrs"));
    Ok(())
}

#[test]
fn test_default_classifier_is_registered() -> anyhow::Result<()> {
    let config = DigrecConfig::default();
    let registry = ClassifierRegistry::with_builtin(&config)?;

    let classifier = registry.get(&config.recognition.default_classifier)?;

    assert_eq!(classifier.name(), config.recognition.default_classifier);
    Ok(())
}

#[test]
fn test_recognize_with_dispatches_by_name() -> anyhow::Result<()> {
    let registry = ClassifierRegistry::with_builtin(&DigrecConfig::default())?;

    let result = registry.recognize_with("reference-centroid", &template(6))?;
    assert_eq!(result.label().digit().map(|d| d.value()), Some(6));

    let result = registry.recognize_with("linear-softmax", &template(6))?;
    assert_eq!(result.label().digit().map(|d| d.value()), Some(6));
    Ok(())
}

#[test]
fn test_unknown_name_is_an_error() -> anyhow::Result<()> {
    let registry = ClassifierRegistry::with_builtin(&DigrecConfig::default())?;

    let err = registry.recognize_with("knn", &blank()).unwrap_err();

    assert!(matches!(err, ClassifierError::UnknownClassifier(ref name) if name == "knn"));
    Ok(())
}

#[test]
fn test_duplicate_name_is_rejected() {
    let mut registry = ClassifierRegistry::new();
    let seven = Digit::new(7).unwrap();
    registry
        .register(Arc::new(FixedDigit { digit: seven }))
        .expect("first registration");

    let err = registry
        .register(Arc::new(FixedDigit { digit: seven }))
        .unwrap_err();

    assert!(matches!(err, ClassifierError::DuplicateClassifier(_)));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_caller_defined_strategy_is_dispatched() -> anyhow::Result<()> {
    let mut registry = ClassifierRegistry::with_builtin(&DigrecConfig::default())?;
    registry.register(Arc::new(FixedDigit {
        digit: Digit::new(3).unwrap(),
    }))?;

    let result = registry.recognize_with("fixed-digit", &blank())?;

    assert_eq!(result.label().digit().map(|d| d.value()), Some(3));
    assert_eq!(registry.names().last(), Some(&"fixed-digit"));
    Ok(())
}

#[test]
fn test_linear_weights_from_config_file() -> anyhow::Result<()> {
    let mut weights = tempfile::Builder::new().suffix(".json").tempfile()?;
    // 2x2 canvas; only digit 3 responds to ink in the top-left pixel
    let mut rows = vec![vec![0.0f32; 4]; 10];
    rows[3][0] = 10.0;
    let json = serde_json::json!({ "weights": rows, "bias": vec![0.0f32; 10] });
    weights.write_all(json.to_string().as_bytes())?;

    let mut config = DigrecConfig::default();
    config.pixels = PixelFormat::new(2, 2);
    config.linear.weights_path = Some(weights.path().to_path_buf());
    let registry = ClassifierRegistry::with_builtin(&config)?;

    let pixels = PixelBuffer::new(config.pixels, vec![1.0, 0.0, 0.0, 0.0])?;
    let result = registry.recognize_with("linear-softmax", &pixels)?;

    assert_eq!(result.label().digit().map(|d| d.value()), Some(3));
    assert!(result.confidence().unwrap() > 0.99);
    Ok(())
}

#[test]
fn test_unreadable_weights_leave_linear_not_ready() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let mut config = DigrecConfig::default();
    config.linear.weights_path = Some(dir.path().join("missing.json"));

    let registry = ClassifierRegistry::with_builtin(&config)?;
    let err = registry.recognize_with("linear-softmax", &template(1)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotReady);
    // other strategies are unaffected
    assert!(registry.recognize_with("reference-centroid", &template(1)).is_ok());
    Ok(())
}
