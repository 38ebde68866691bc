//! Awaitable recognition with deadlines and cancellation.
//!
//! `recognize` itself is synchronous. These helpers run it on the tokio
//! blocking pool so async hosts can await it, and turn a timeout or a cancel
//! signal into a `Cancelled` error. An abandoned call keeps running on its
//! worker thread until it finishes, but its result is discarded.

use crate::classification::Classification;
use crate::classifier::Classifier;
use crate::error::{ClassifierError, Result};
use crate::pixels::PixelBuffer;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

fn spawn_recognition(
    classifier: Arc<dyn Classifier>,
    pixels: PixelBuffer,
) -> JoinHandle<Result<Classification>> {
    tokio::task::spawn_blocking(move || classifier.recognize(&pixels))
}

fn join_failed(name: &str, e: tokio::task::JoinError) -> ClassifierError {
    if e.is_cancelled() {
        ClassifierError::cancelled(name, "recognition task was aborted")
    } else {
        ClassifierError::inference(name, format!("recognition task failed: {}", e))
    }
}

/// Run `recognize` on a blocking worker and wait for it
pub async fn recognize_blocking(
    classifier: Arc<dyn Classifier>,
    pixels: PixelBuffer,
) -> Result<Classification> {
    let name = classifier.name().to_string();
    spawn_recognition(classifier, pixels)
        .await
        .map_err(|e| join_failed(&name, e))?
}

/// Run `recognize`, failing with `Cancelled` if it does not finish within `deadline`
pub async fn recognize_with_deadline(
    classifier: Arc<dyn Classifier>,
    pixels: PixelBuffer,
    deadline: Duration,
) -> Result<Classification> {
    let name = classifier.name().to_string();
    match tokio::time::timeout(deadline, spawn_recognition(classifier, pixels)).await {
        Ok(joined) => joined.map_err(|e| join_failed(&name, e))?,
        Err(_) => {
            debug!(classifier = %name, ?deadline, "recognition timed out");
            Err(ClassifierError::cancelled(
                name,
                format!("deadline of {:?} exceeded", deadline),
            ))
        }
    }
}

/// Run `recognize`, failing with `Cancelled` as soon as `cancel` completes
pub async fn recognize_until<F>(
    classifier: Arc<dyn Classifier>,
    pixels: PixelBuffer,
    cancel: F,
) -> Result<Classification>
where
    F: Future<Output = ()>,
{
    let name = classifier.name().to_string();
    let handle = spawn_recognition(classifier, pixels);
    tokio::select! {
        biased;
        _ = cancel => {
            debug!(classifier = %name, "recognition cancelled by caller");
            Err(ClassifierError::cancelled(name, "cancelled by caller"))
        }
        joined = handle => joined.map_err(|e| join_failed(&name, e))?,
    }
}
