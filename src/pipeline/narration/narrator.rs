//! Narrative generation with graceful degradation.
//!
//! The narrator probes the text-generation service exactly once at process
//! start; the result is immutable for the process lifetime. Per-condition
//! explanations then resolve to one of four terminal outcomes: verbatim
//! service text, or a canned fallback (unavailable / too short / error).

use tracing::{info, warn};

use super::ollama::LlmClient;
use super::prompt::build_analysis_prompt;
use super::NarrationError;

/// Responses shorter than this are replaced with the canned fallback.
/// Strict less-than: a response of exactly this length is kept.
pub const MIN_ANALYSIS_CHARS: usize = 50;

pub struct Narrator {
    llm: Box<dyn LlmClient>,
    model: String,
    available: bool,
}

impl Narrator {
    /// Probe the service once and fix availability for the process lifetime.
    ///
    /// An unavailable service is not an error — every explanation simply
    /// resolves to canned text without further network calls.
    pub fn connect(llm: Box<dyn LlmClient>, model: &str) -> Self {
        let available = match llm.chat(model, "test") {
            Ok(_) => {
                info!(model, "Connected to language model");
                true
            }
            Err(e) => {
                warn!(
                    model,
                    error = %e,
                    "Language model unavailable — analyses will use fallback text"
                );
                false
            }
        };

        Self {
            llm,
            model: model.to_string(),
            available,
        }
    }

    /// Construct with a pre-determined availability flag (no probe).
    pub fn with_availability(llm: Box<dyn LlmClient>, model: &str, available: bool) -> Self {
        Self {
            llm,
            model: model.to_string(),
            available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Produce a clinical explanation for the detected condition.
    ///
    /// Never fails; every outcome is a usable string.
    pub fn explain(&self, condition: &str) -> String {
        if !self.available {
            // Skip the guaranteed-failing round trip.
            info!(condition, "Language model not available — using fallback analysis");
            return unavailable_fallback(condition);
        }

        match self.llm.chat(&self.model, &build_analysis_prompt(condition)) {
            Ok(content) if content.chars().count() >= MIN_ANALYSIS_CHARS => content,
            Ok(_) => {
                warn!(condition, "Analysis too short — using fallback");
                too_short_fallback(condition)
            }
            Err(NarrationError::MalformedResponse(detail)) => {
                warn!(condition, detail, "Malformed analysis response — using fallback");
                too_short_fallback(condition)
            }
            Err(e) => {
                warn!(condition, error = %e, "Error querying language model — using fallback");
                error_fallback(condition)
            }
        }
    }
}

pub fn unavailable_fallback(condition: &str) -> String {
    format!("Analysis for {condition}: this is a fallback analysis as the language model is not available.")
}

pub fn too_short_fallback(condition: &str) -> String {
    format!("Analysis for {condition}: this is a fallback analysis as the language model response was too short.")
}

pub fn error_fallback(condition: &str) -> String {
    format!("Analysis for {condition}: this is a fallback analysis due to an error querying the language model.")
}
