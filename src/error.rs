//! Error types for digit recognition

use thiserror::Error;

/// Result type for recognition operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Coarse error category, for callers that only need to branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotReady,
    Cancelled,
    Other,
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The pixel buffer violates the length or value-range contract
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Backing resources (model weights, OCR engine) are absent or failed to load
    #[error("Classifier '{classifier}' is not ready: {reason}")]
    NotReady { classifier: String, reason: String },

    /// An in-flight recognition was aborted by timeout or caller request
    #[error("Recognition with '{classifier}' was cancelled: {reason}")]
    Cancelled { classifier: String, reason: String },

    /// The backing engine failed while computing an answer
    #[error("Inference failed in '{classifier}': {message}")]
    Inference { classifier: String, message: String },

    #[error("Unknown classifier: {0}")]
    UnknownClassifier(String),

    #[error("A classifier named '{0}' is already registered")]
    DuplicateClassifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClassifierError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_ready(classifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotReady {
            classifier: classifier.into(),
            reason: reason.into(),
        }
    }

    pub fn cancelled(classifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Cancelled {
            classifier: classifier.into(),
            reason: reason.into(),
        }
    }

    pub fn inference(classifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Inference {
            classifier: classifier.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::NotReady { .. } => ErrorKind::NotReady,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            _ => ErrorKind::Other,
        }
    }
}
