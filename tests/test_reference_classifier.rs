//! Integration tests for the reference centroid classifier.
//!
//! Tests cover:
//! - Blank canvas and exact template scenarios
//! - Ranked alternatives
//! - Rejection of malformed buffers
//! - Unrecognized answers for ink that matches no template

mod common;

use digrec::CentroidClassifier;

use common::*;

#[test]
fn test_name_is_descriptive() {
    let classifier = CentroidClassifier::new();
    assert_eq!(classifier.name(), "reference-centroid");
}

#[test]
fn test_blank_canvas_is_unrecognized() -> anyhow::Result<()> {
    let classifier = CentroidClassifier::new();

    let result = classifier.recognize(&blank())?;

    assert_eq!(result.label(), Label::Unrecognized);
    assert_eq!(result.confidence(), Some(0.0));
    Ok(())
}

#[test]
fn test_exact_one_template_has_full_confidence() -> anyhow::Result<()> {
    let classifier = CentroidClassifier::new();

    let result = classifier.recognize(&template(1))?;

    assert_eq!(result.label(), Label::Digit(Digit::new(1).unwrap()));
    assert_eq!(result.confidence(), Some(1.0));
    Ok(())
}

#[test]
fn test_every_template_recognizes_itself() -> anyhow::Result<()> {
    let classifier = CentroidClassifier::new();

    for d in 0..=9u8 {
        let result = classifier.recognize(&template(d))?;
        assert_eq!(
            result.label().digit().map(|d| d.value()),
            Some(d),
            "template {} was classified as {}",
            d,
            result.label()
        );
        assert_eq!(result.confidence(), Some(1.0));
    }
    Ok(())
}

#[test]
fn test_alternatives_rank_all_digits() -> anyhow::Result<()> {
    let classifier = CentroidClassifier::new();

    let result = classifier.recognize(&template(8))?;
    let alternatives = result.alternatives();

    assert_eq!(alternatives.len(), 10);
    assert_eq!(alternatives[0].digit.value(), 8);
    assert!(alternatives.windows(2).all(|w| w[0].score >= w[1].score));
    assert!(alternatives[1].score < 1.0);
    Ok(())
}

#[test]
fn test_dimmed_template_scores_below_exact_match() -> anyhow::Result<()> {
    let classifier = CentroidClassifier::new();

    let exact = classifier.recognize(&template(4))?;
    let dimmed = classifier.recognize(&shifted_template(4, 0, 0.5))?;

    assert_eq!(dimmed.label().digit().map(|d| d.value()), Some(4));
    assert!(dimmed.confidence() < exact.confidence());
    Ok(())
}

#[test]
fn test_ink_outside_templates_is_unrecognized() -> anyhow::Result<()> {
    let classifier = CentroidClassifier::new();

    // 3x3 blob in the left margin, where no glyph has ink
    let mut samples = vec![0.0; 784];
    for y in 10..13 {
        for x in 0..3 {
            samples[y * 28 + x] = 1.0;
        }
    }
    let pixels = PixelBuffer::from_samples(samples)?;

    let result = classifier.recognize(&pixels)?;

    assert!(result.is_unrecognized());
    assert_eq!(result.confidence(), Some(0.0));
    Ok(())
}

#[test]
fn test_short_buffer_is_invalid_input() {
    let classifier = CentroidClassifier::new();
    let pixels = PixelBuffer::new_unchecked(PixelFormat::CANONICAL, vec![0.0; 783]);

    let err = classifier.recognize(&pixels).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[test]
fn test_out_of_range_sample_is_invalid_input() {
    let classifier = CentroidClassifier::new();
    let mut samples = template(3).into_samples();
    samples[100] = 2.0;
    let pixels = PixelBuffer::new_unchecked(PixelFormat::CANONICAL, samples);

    let err = classifier.recognize(&pixels).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(err.to_string().contains("range"));
}

#[test]
fn test_buffer_for_other_format_is_rejected() {
    let classifier = CentroidClassifier::new();
    let pixels = PixelBuffer::blank(PixelFormat::new(16, 16));

    let err = classifier.recognize(&pixels).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
