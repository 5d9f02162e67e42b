//! Lesion classifier with graceful degradation.
//!
//! Wraps an optional inference backend. When the model artifact is missing
//! at startup or the inference call fails, the classifier substitutes a
//! normalized random distribution over the catalog labels so the pipeline
//! never halts on a well-formed image.

use rand::Rng;
use tracing::{debug, warn};

use super::preprocess::ImageTensor;
use super::InferenceError;

/// Raw model output: shape plus flattened data, before any normalization.
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

/// Inference backend abstraction (allows mocking)
pub trait InferenceBackend: Send + Sync {
    fn run(&self, tensor: &ImageTensor) -> Result<RawOutput, InferenceError>;
}

/// A probability distribution over the catalog labels.
///
/// `degraded` marks substitute distributions so callers can surface
/// reduced-confidence messaging; the report shape stays identical either way.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub probabilities: Vec<f32>,
    pub degraded: bool,
}

impl Prediction {
    /// Index of the most probable label. `None` only for an empty vector.
    pub fn argmax(&self) -> Option<usize> {
        self.probabilities
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }

    /// Probability mass of the predicted label, clamped to [0, 1].
    pub fn confidence(&self) -> f32 {
        self.argmax()
            .map(|i| self.probabilities[i].clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }
}

/// Classifier over a fixed number of condition labels.
///
/// Owns the (optional) loaded model. Loaded once at process start, read-only
/// afterwards — safe to share across concurrent requests.
pub struct Classifier {
    backend: Option<Box<dyn InferenceBackend>>,
    num_classes: usize,
}

impl Classifier {
    pub fn new(backend: Option<Box<dyn InferenceBackend>>, num_classes: usize) -> Self {
        Self {
            backend,
            num_classes,
        }
    }

    /// Whether a real model is loaded (false means every prediction is a
    /// substitute distribution).
    pub fn has_model(&self) -> bool {
        self.backend.is_some()
    }

    /// Classify a normalized image tensor.
    ///
    /// Never fails: absence of a model, a failed inference call, or an
    /// output that does not match the catalog size all yield a substitute
    /// distribution flagged as degraded.
    pub fn classify(&self, tensor: &ImageTensor) -> Prediction {
        let Some(backend) = &self.backend else {
            warn!("No model loaded — substituting a random prediction distribution");
            return self.substitute();
        };

        match backend.run(tensor) {
            Ok(raw) => match self.to_probabilities(raw) {
                Some(probabilities) => {
                    debug!(classes = probabilities.len(), "Model prediction completed");
                    Prediction {
                        probabilities,
                        degraded: false,
                    }
                }
                None => {
                    warn!(
                        expected = self.num_classes,
                        "Model output does not match the catalog size — substituting"
                    );
                    self.substitute()
                }
            },
            Err(e) => {
                warn!(error = %e, "Inference failed — substituting a random prediction distribution");
                self.substitute()
            }
        }
    }

    /// Turn raw model output into a probability vector over the catalog.
    ///
    /// Multi-unit output (shape implies more than one class score) gets a
    /// softmax; a single scalar is taken as the flattened probability-like
    /// output directly. The distinction is made from shape alone.
    fn to_probabilities(&self, raw: RawOutput) -> Option<Vec<f32>> {
        let mut values = raw.data;
        if raw.shape.len() > 1 && raw.shape[1] > 1 {
            softmax_in_place(&mut values);
        }
        if values.len() != self.num_classes {
            return None;
        }
        Some(values)
    }

    /// Substitute distribution: N independent uniform draws normalized by
    /// their sum — a valid probability vector by construction.
    fn substitute(&self) -> Prediction {
        let mut rng = rand::thread_rng();
        let mut draws: Vec<f32> = (0..self.num_classes).map(|_| rng.gen::<f32>()).collect();
        let sum: f32 = draws.iter().sum();
        if sum > 0.0 {
            for d in &mut draws {
                *d /= sum;
            }
        } else {
            draws.fill(1.0 / self.num_classes.max(1) as f32);
        }
        Prediction {
            probabilities: draws,
            degraded: true,
        }
    }
}

/// Numerically stable in-place softmax.
fn softmax_in_place(values: &mut [f32]) {
    let max = values.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return;
    }
    let mut sum = 0.0f32;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}

/// Load the ONNX backend from the given model path, tolerating absence.
///
/// A missing artifact (or a build without the `onnx-model` feature) returns
/// `None` — the classifier then runs degraded instead of refusing to start.
pub fn load_backend(model_path: &std::path::Path) -> Option<Box<dyn InferenceBackend>> {
    #[cfg(feature = "onnx-model")]
    match OnnxBackend::load(model_path) {
        Ok(backend) => return Some(Box::new(backend)),
        Err(e) => {
            warn!(
                path = %model_path.display(),
                error = %e,
                "Classifier model unavailable — predictions will be substituted"
            );
        }
    }

    #[cfg(not(feature = "onnx-model"))]
    warn!(
        path = %model_path.display(),
        "Built without the onnx-model feature — predictions will be substituted"
    );

    None
}

// ═══════════════════════════════════════════════════════════
// ONNX backend — behind `onnx-model` feature
// ═══════════════════════════════════════════════════════════

#[cfg(feature = "onnx-model")]
mod onnx {
    use std::path::Path;
    use std::sync::Mutex;

    use ort::session::Session;

    use super::{ImageTensor, InferenceBackend, InferenceError, RawOutput};

    /// Real classifier backend using ONNX Runtime.
    ///
    /// Uses interior mutability (Mutex) because ort::Session::run requires
    /// `&mut self` but the InferenceBackend trait exposes `&self` for
    /// ergonomic shared usage.
    pub struct OnnxBackend {
        session: Mutex<Session>,
    }

    impl OnnxBackend {
        /// Load the ONNX classifier from a model file.
        pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
            if !model_path.exists() {
                return Err(InferenceError::ModelNotFound(model_path.to_path_buf()));
            }

            let session = Session::builder()
                .map_err(|e: ort::Error| InferenceError::ModelInit(e.to_string()))?
                .with_intra_threads(2)
                .map_err(|e: ort::Error| InferenceError::ModelInit(e.to_string()))?
                .commit_from_file(model_path)
                .map_err(|e: ort::Error| {
                    InferenceError::ModelInit(format!("ONNX load failed: {e}"))
                })?;

            tracing::info!("ONNX classifier loaded from {}", model_path.display());

            Ok(Self {
                session: Mutex::new(session),
            })
        }
    }

    impl InferenceBackend for OnnxBackend {
        fn run(&self, tensor: &ImageTensor) -> Result<RawOutput, InferenceError> {
            use ort::value::TensorRef;

            let [n, h, w, c] = tensor.shape;
            let array = ndarray::Array4::from_shape_vec((n, h, w, c), tensor.data.clone())
                .map_err(|e| InferenceError::Inference(e.to_string()))?;

            let input = TensorRef::from_array_view(&array)
                .map_err(|e| InferenceError::Inference(e.to_string()))?;

            let mut session = self
                .session
                .lock()
                .map_err(|_| InferenceError::Inference("Session lock poisoned".to_string()))?;

            let outputs = session
                .run(ort::inputs![input])
                .map_err(|e| InferenceError::Inference(format!("ONNX inference failed: {e}")))?;

            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| InferenceError::Inference(format!("Output extraction: {e}")))?;

            Ok(RawOutput {
                shape: shape.iter().map(|&d| d as usize).collect(),
                data: data.to_vec(),
            })
        }
    }
}

#[cfg(feature = "onnx-model")]
pub use onnx::OnnxBackend;

// ═══════════════════════════════════════════════════════════
// Mock backend (testing)
// ═══════════════════════════════════════════════════════════

/// Mock inference backend — returns a configurable output or failure.
pub struct MockBackend {
    output: Option<RawOutput>,
}

impl MockBackend {
    /// A backend that always returns the given shape + data.
    pub fn returning(shape: Vec<usize>, data: Vec<f32>) -> Self {
        Self {
            output: Some(RawOutput { shape, data }),
        }
    }

    /// A backend whose inference call always fails.
    pub fn failing() -> Self {
        Self { output: None }
    }
}

impl InferenceBackend for MockBackend {
    fn run(&self, _tensor: &ImageTensor) -> Result<RawOutput, InferenceError> {
        match &self.output {
            Some(out) => Ok(out.clone()),
            None => Err(InferenceError::Inference("mock inference failure".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tensor() -> ImageTensor {
        ImageTensor {
            data: vec![0.5; 224 * 224 * 3],
            shape: [1, 224, 224, 3],
        }
    }

    fn assert_valid_distribution(probs: &[f32], n: usize) {
        assert_eq!(probs.len(), n);
        assert!(probs.iter().all(|&p| p >= 0.0), "negative entry in {probs:?}");
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4, "sum was {sum}");
    }

    #[test]
    fn missing_model_substitutes_valid_distribution() {
        let classifier = Classifier::new(None, 7);
        let prediction = classifier.classify(&unit_tensor());

        assert!(prediction.degraded);
        assert_valid_distribution(&prediction.probabilities, 7);
    }

    #[test]
    fn failing_backend_substitutes_valid_distribution() {
        let classifier = Classifier::new(Some(Box::new(MockBackend::failing())), 9);
        let prediction = classifier.classify(&unit_tensor());

        assert!(prediction.degraded);
        assert_valid_distribution(&prediction.probabilities, 9);
    }

    #[test]
    fn multi_class_logits_get_softmaxed() {
        let backend = MockBackend::returning(vec![1, 7], vec![0.0, 1.0, 2.0, 3.0, 9.0, 1.0, 0.5]);
        let classifier = Classifier::new(Some(Box::new(backend)), 7);
        let prediction = classifier.classify(&unit_tensor());

        assert!(!prediction.degraded);
        assert_valid_distribution(&prediction.probabilities, 7);
        assert_eq!(prediction.argmax(), Some(4));
    }

    #[test]
    fn scalar_output_passes_through_unsoftmaxed() {
        // A single output unit with a one-class catalog: the bounded value
        // is taken as-is rather than softmaxed to a constant 1.0 vector of
        // the wrong meaning.
        let backend = MockBackend::returning(vec![1, 1], vec![0.73]);
        let classifier = Classifier::new(Some(Box::new(backend)), 1);
        let prediction = classifier.classify(&unit_tensor());

        assert!(!prediction.degraded);
        assert!((prediction.probabilities[0] - 0.73).abs() < 1e-6);
    }

    #[test]
    fn output_size_mismatch_substitutes() {
        let backend = MockBackend::returning(vec![1, 4], vec![0.1, 0.2, 0.3, 0.4]);
        let classifier = Classifier::new(Some(Box::new(backend)), 7);
        let prediction = classifier.classify(&unit_tensor());

        assert!(prediction.degraded);
        assert_valid_distribution(&prediction.probabilities, 7);
    }

    #[test]
    fn argmax_always_within_catalog_range() {
        let classifier = Classifier::new(None, 10);
        for _ in 0..50 {
            let prediction = classifier.classify(&unit_tensor());
            let index = prediction.argmax().unwrap();
            assert!(index < 10);
        }
    }

    #[test]
    fn confidence_bounded_to_unit_interval() {
        let backend = MockBackend::returning(vec![1, 3], vec![100.0, -50.0, 3.0]);
        let classifier = Classifier::new(Some(Box::new(backend)), 3);
        let prediction = classifier.classify(&unit_tensor());

        let confidence = prediction.confidence();
        assert!((0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn empty_prediction_has_no_argmax() {
        let prediction = Prediction {
            probabilities: vec![],
            degraded: true,
        };
        assert_eq!(prediction.argmax(), None);
        assert_eq!(prediction.confidence(), 0.0);
    }

    #[test]
    fn softmax_handles_large_logits() {
        let mut values = vec![1000.0, 1001.0, 999.0];
        softmax_in_place(&mut values);
        let sum: f32 = values.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn has_model_reflects_backend_presence() {
        assert!(!Classifier::new(None, 7).has_model());
        assert!(Classifier::new(Some(Box::new(MockBackend::failing())), 7).has_model());
    }
}
