mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from digrec for tests
pub use digrec::{
    Classification, Classifier, ClassifierError, ClassifierRegistry, DigrecConfig, Digit,
    ErrorKind, Label, PixelBuffer, PixelFormat,
};
