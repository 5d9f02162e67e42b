/// Build the clinical analysis prompt for a detected condition.
///
/// The three fixed sections keep downstream rendering predictable; the
/// response is not otherwise validated against them.
pub fn build_analysis_prompt(condition: &str) -> String {
    format!(
        r#"Provide a brief medical analysis of the skin condition '{condition}'. Format the response in these sections:

SYMPTOMS:
- List 2-3 key symptoms
- Keep descriptions short and clear

CAUSES:
- List 2-3 main causes
- One line per cause

TREATMENT:
- List 2-3 primary treatment options
- Focus on immediate actions"#
    )
}
