//! Diagnostic inference pipeline:
//! image decoding/normalization → model inference → label/recommendation
//! lookup → narrative generation → response assembly.
//!
//! Every stage past decoding is fault-tolerant: a failed or absent model
//! substitutes a valid probability distribution, an unreachable narrator
//! substitutes canned text, and anything else collapses into a generic
//! fallback report. Decode failure is the one error that reaches the caller.

pub mod analyzer;
pub mod catalog;
pub mod classifier;
pub mod narration;
pub mod preprocess;
pub mod report;

pub use analyzer::*;
pub use catalog::*;
pub use classifier::*;
pub use preprocess::*;
pub use report::*;

use std::path::PathBuf;

use thiserror::Error;

/// Image decoding failures. Surfaced to the caller as a 400-class error —
/// there is no meaningful prediction to substitute for non-image input.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid data URI: {0}")]
    DataUri(String),

    #[error("Image decoding failed: {0}")]
    InvalidImage(String),

    #[error("Image payload out of bounds: {0}")]
    PayloadBounds(String),

    #[error("I/O error reading image: {0}")]
    Io(#[from] std::io::Error),
}

/// Classifier-side failures. Never reach the caller: the classifier masks
/// them with a substitute distribution and flags the prediction as degraded.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Model artifact not found at {0}")]
    ModelNotFound(PathBuf),

    #[error("Model initialization failed: {0}")]
    ModelInit(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}
