use super::{Classifier, DecisionThresholds};
use crate::classification::{Classification, Digit};
use crate::error::{ClassifierError, Result};
use crate::pixels::{PixelBuffer, PixelFormat};
use crate::preprocess;
use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
use rten::Model;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

pub const DETECTION_MODEL_FILE: &str = "text-detection.rten";
pub const RECOGNITION_MODEL_FILE: &str = "text-recognition.rten";

/// `get_text` reports no per-character score, so recognized digits carry this confidence
const OCR_CONFIDENCE: f32 = 0.9;

/// Side of the square canvas the buffer is rendered onto before OCR
const OCR_CANVAS_SIZE: u32 = 100;

/// Standard ocrs model cache location, `~/.cache/ocrs`
pub fn default_model_dir() -> Option<PathBuf> {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()?;
    Some(Path::new(&home_dir).join(".cache/ocrs"))
}

/// Initialize an OCR engine with the detection and recognition models in `model_dir`
pub fn init_ocr_engine(model_dir: &Path) -> Result<OcrEngine> {
    let detection_model_path = model_dir.join(DETECTION_MODEL_FILE);
    let recognition_model_path = model_dir.join(RECOGNITION_MODEL_FILE);

    if !detection_model_path.exists() || !recognition_model_path.exists() {
        return Err(ClassifierError::not_ready(
            OcrClassifier::NAME,
            format!(
                "OCR models not found. Expected locations:\n  - {}\n  - {}",
                detection_model_path.display(),
                recognition_model_path.display()
            ),
        ));
    }

    let load = |path: &Path| {
        Model::load_file(path).map_err(|e| {
            ClassifierError::not_ready(
                OcrClassifier::NAME,
                format!("failed to load {}: {}", path.display(), e),
            )
        })
    };
    let detection_model = load(&detection_model_path)?;
    let recognition_model = load(&recognition_model_path)?;

    OcrEngine::new(OcrEngineParams {
        detection_model: Some(detection_model),
        recognition_model: Some(recognition_model),
        ..Default::default()
    })
    .map_err(|e| ClassifierError::not_ready(OcrClassifier::NAME, e.to_string()))
}

/// First ASCII digit in OCR output, if any
fn first_digit(text: &str) -> Option<Digit> {
    text.chars().find_map(Digit::from_char)
}

/// Recognition through the `ocrs` text engine.
///
/// The engine is loaded lazily on the first call and cached behind a mutex;
/// concurrent calls are supported and share one engine once it is loaded. If
/// the models are missing every call fails with `NotReady` and the load is
/// retried on the next call.
pub struct OcrClassifier {
    model_dir: Option<PathBuf>,
    format: PixelFormat,
    thresholds: DecisionThresholds,
    engine: Mutex<Option<Arc<OcrEngine>>>,
}

impl OcrClassifier {
    pub const NAME: &'static str = "ocrs";

    /// Use models from `model_dir`, or the standard cache location when `None`
    pub fn new(
        model_dir: Option<PathBuf>,
        format: PixelFormat,
        thresholds: DecisionThresholds,
    ) -> Self {
        Self {
            model_dir: model_dir.or_else(default_model_dir),
            format,
            thresholds,
            engine: Mutex::new(None),
        }
    }

    /// Wrap an engine that is already loaded
    pub fn with_engine(
        engine: OcrEngine,
        format: PixelFormat,
        thresholds: DecisionThresholds,
    ) -> Self {
        Self {
            model_dir: None,
            format,
            thresholds,
            engine: Mutex::new(Some(Arc::new(engine))),
        }
    }

    pub fn model_dir(&self) -> Option<&Path> {
        self.model_dir.as_deref()
    }

    pub fn thresholds(&self) -> DecisionThresholds {
        self.thresholds
    }

    fn engine(&self) -> Result<Arc<OcrEngine>> {
        // Clone the Arc so the lock is released before inference
        let mut guard = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(engine) = guard.as_ref() {
            return Ok(engine.clone());
        }

        let model_dir = self.model_dir.as_deref().ok_or_else(|| {
            ClassifierError::not_ready(Self::NAME, "no model directory configured")
        })?;
        info!(classifier = Self::NAME, model_dir = %model_dir.display(), "initializing OCR engine");
        match init_ocr_engine(model_dir) {
            Ok(engine) => {
                let engine = Arc::new(engine);
                *guard = Some(engine.clone());
                info!(classifier = Self::NAME, "OCR engine initialized");
                Ok(engine)
            }
            Err(e) => {
                warn!(classifier = Self::NAME, error = %e, "OCR engine unavailable");
                Err(e)
            }
        }
    }
}

impl Classifier for OcrClassifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn recognize(&self, pixels: &PixelBuffer) -> Result<Classification> {
        pixels.validate_for(&self.format)?;
        let engine = self.engine()?;

        let input: Vec<f32> = pixels
            .samples()
            .iter()
            .map(|&v| self.format.normalize(v))
            .collect();
        if self.thresholds.is_blank(&input) {
            debug!(classifier = Self::NAME, "blank canvas");
            return Ok(Classification::unrecognized(0.0));
        }

        let canvas = preprocess::render_for_ocr(pixels, OCR_CANVAS_SIZE);
        let img = DynamicImage::ImageLuma8(canvas).to_rgb8();

        let img_source = ImageSource::from_bytes(img.as_raw(), img.dimensions())
            .map_err(|e| ClassifierError::inference(Self::NAME, e.to_string()))?;
        let ocr_input = engine
            .prepare_input(img_source)
            .map_err(|e| ClassifierError::inference(Self::NAME, e.to_string()))?;
        let text = engine
            .get_text(&ocr_input)
            .map_err(|e| ClassifierError::inference(Self::NAME, e.to_string()))?;

        let text = text.trim();
        debug!(classifier = Self::NAME, text, "OCR output");

        Ok(match first_digit(text) {
            Some(digit) => Classification::digit(digit, OCR_CONFIDENCE),
            None => Classification::unrecognized(0.0),
        })
    }

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }
}
