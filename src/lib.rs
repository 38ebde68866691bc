pub mod classification;
pub mod classifier;
pub mod config;
pub mod error;
pub mod pixels;
pub mod preprocess;
pub mod registry;
pub mod task;

pub use classification::{Candidate, Classification, Digit, Label};
pub use classifier::{
    CentroidClassifier, Classifier, DecisionThresholds, LinearClassifier, OcrClassifier,
};
pub use config::DigrecConfig;
pub use error::{ClassifierError, ErrorKind, Result};
pub use pixels::{PixelBuffer, PixelFormat};
pub use registry::ClassifierRegistry;
