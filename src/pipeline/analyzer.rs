//! Analysis orchestration:
//! decode → classify → resolve → recommend → narrate → assemble.
//!
//! Only decode failure escapes to the caller. Classification and narration
//! degrade internally, and any residual invariant violation collapses into
//! the generic fallback report — the response shape is always stable.

use tracing::{debug, warn};

use super::catalog::LabelCatalog;
use super::classifier::Classifier;
use super::narration::Narrator;
use super::preprocess::{self, ImageInput};
use super::report::{self, DiagnosisReport};
use super::DecodeError;

/// The assembled pipeline. Constructed once at process start from immutable
/// parts; shared read-only across concurrent requests.
pub struct LesionAnalyzer {
    classifier: Classifier,
    narrator: Narrator,
    catalog: LabelCatalog,
}

impl LesionAnalyzer {
    pub fn new(classifier: Classifier, narrator: Narrator, catalog: LabelCatalog) -> Self {
        Self {
            classifier,
            narrator,
            catalog,
        }
    }

    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.has_model()
    }

    pub fn narrator_available(&self) -> bool {
        self.narrator.is_available()
    }

    /// Run one full analysis.
    ///
    /// `DecodeError` is the only failure a caller can see — non-image input
    /// has no meaningful prediction to substitute. Everything past decoding
    /// produces a well-formed report.
    pub fn analyze(&self, input: ImageInput) -> Result<DiagnosisReport, DecodeError> {
        let tensor = preprocess::to_tensor(input)?;
        Ok(self.analyze_tensor(&tensor))
    }

    fn analyze_tensor(&self, tensor: &preprocess::ImageTensor) -> DiagnosisReport {
        let prediction = self.classifier.classify(tensor);

        let Some(index) = prediction.argmax() else {
            warn!("Empty prediction vector — returning generic fallback report");
            return report::fallback_report();
        };

        let condition = self.catalog.resolve(index);
        let confidence = prediction.confidence();
        debug!(
            condition = condition.name,
            confidence,
            degraded = prediction.degraded,
            "Prediction resolved"
        );

        let recommendations = self.catalog.recommendations_for(condition.name);
        let detailed_analysis = self.narrator.explain(condition.name);

        report::assemble(condition.name, confidence, recommendations, detailed_analysis)
    }
}
