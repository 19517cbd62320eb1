//! Formula-explanation prompt

/// Fixed template asking for the Excel formula behind a question
///
/// The question is substituted verbatim.
pub fn formula_explanation_prompt(question: &str) -> String {
    format!(
        "Explain the Excel formula to calculate: '{}'. Provide the exact formula.",
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_exact() {
        assert_eq!(
            formula_explanation_prompt("How do I calculate CAGR in excel?"),
            "Explain the Excel formula to calculate: 'How do I calculate CAGR in excel?'. Provide the exact formula."
        );
    }
}
