//! Diagnostic report assembly.
//!
//! The report shape never varies by failure mode: callers always receive a
//! fully-formed `DiagnosisReport`, degraded or not. The timestamp is
//! captured at assembly time, not at request arrival.

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::catalog::{GENERIC_RECOMMENDATIONS, UNKNOWN_CONDITION};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Complete result of one lesion analysis. Assembled once per request and
/// returned directly to the caller; never retained server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub condition: String,
    pub confidence: f32,
    pub description: String,
    pub recommendations: Vec<String>,
    pub detailed_analysis: String,
    pub timestamp: String,
}

/// Compose the canonical response from the upstream stage outputs.
pub fn assemble(
    condition: &str,
    confidence: f32,
    recommendations: &[&str],
    detailed_analysis: String,
) -> DiagnosisReport {
    let confidence = confidence.clamp(0.0, 1.0);
    DiagnosisReport {
        condition: condition.to_string(),
        confidence,
        description: format!(
            "Detected {condition} with {}% confidence.",
            (confidence * 100.0).round() as u32
        ),
        recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
        detailed_analysis,
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    }
}

/// Generic fallback report for unexpected failures downstream of decoding.
pub fn fallback_report() -> DiagnosisReport {
    DiagnosisReport {
        condition: UNKNOWN_CONDITION.to_string(),
        confidence: 0.0,
        description:
            "Unable to analyze the image. Please try again or consult a medical professional."
                .to_string(),
        recommendations: GENERIC_RECOMMENDATIONS
            .iter()
            .map(|s| s.to_string())
            .collect(),
        detailed_analysis: "This is a fallback analysis due to an error during processing."
            .to_string(),
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn description_rounds_percentage() {
        let report = assemble("Melanoma", 0.876, &["See a doctor"], "analysis".into());
        assert_eq!(report.description, "Detected Melanoma with 88% confidence.");
    }

    #[test]
    fn confidence_clamped_to_unit_interval() {
        let report = assemble("Melanoma", 1.7, &[], "analysis".into());
        assert_eq!(report.confidence, 1.0);
        assert_eq!(report.description, "Detected Melanoma with 100% confidence.");
    }

    #[test]
    fn timestamp_matches_fixed_pattern() {
        let report = assemble("Eczema", 0.5, &[], "analysis".into());
        assert!(
            NaiveDateTime::parse_from_str(&report.timestamp, TIMESTAMP_FORMAT).is_ok(),
            "unexpected timestamp {}",
            report.timestamp
        );
    }

    #[test]
    fn fallback_report_is_fully_formed() {
        let report = fallback_report();
        assert_eq!(report.condition, UNKNOWN_CONDITION);
        assert_eq!(report.confidence, 0.0);
        assert_eq!(report.recommendations.len(), 4);
        assert!(!report.detailed_analysis.is_empty());
        assert!(NaiveDateTime::parse_from_str(&report.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn report_serializes_with_wire_field_names() {
        let report = assemble("Nevus", 0.42, &["Monitor for changes"], "analysis".into());
        let json = serde_json::to_string(&report).unwrap();
        for field in [
            "\"condition\"",
            "\"confidence\"",
            "\"description\"",
            "\"recommendations\"",
            "\"detailed_analysis\"",
            "\"timestamp\"",
        ] {
            assert!(json.contains(field), "missing {field}");
        }
    }
}
