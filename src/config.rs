use std::path::PathBuf;

use crate::pipeline::catalog::CatalogVariant;

/// Application-level constants
pub const APP_NAME: &str = "DermaLens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Get the application data directory
/// ~/DermaLens/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("DermaLens")
}

/// Get the models directory
pub fn models_dir() -> PathBuf {
    app_data_dir().join("models")
}

/// Path to the lesion classifier ONNX artifact.
///
/// Overridable via `DERMALENS_MODEL_PATH`. The file is allowed to be absent:
/// the classifier then runs in degraded mode with substitute predictions.
pub fn model_path() -> PathBuf {
    match std::env::var("DERMALENS_MODEL_PATH") {
        Ok(p) if !p.is_empty() => PathBuf::from(p),
        _ => models_dir().join("lesion-classifier.onnx"),
    }
}

/// Which label catalog this deployment runs against.
///
/// `DERMALENS_CATALOG` selects one of the named variants; unknown values
/// fall back to the default (HAM10000). The catalog is fixed at process
/// start and never changes afterwards.
pub fn catalog_variant() -> CatalogVariant {
    match std::env::var("DERMALENS_CATALOG") {
        Ok(v) => v.parse().unwrap_or_default(),
        Err(_) => CatalogVariant::default(),
    }
}

/// Base URL of the local Ollama instance.
pub fn ollama_base_url() -> String {
    std::env::var("OLLAMA_HOST")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "http://localhost:11434".to_string())
}

/// Narrator model name. The original deployment runs llama3.2.
pub fn narrator_model() -> String {
    std::env::var("DERMALENS_NARRATOR_MODEL")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "llama3.2".to_string())
}

/// HTTP port for the analysis API.
pub fn port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000)
}
