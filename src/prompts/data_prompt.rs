//! Data-grounded question prompt

/// Generates the prompt for a question grounded in spreadsheet data
///
/// The prompt has three slots in a fixed order: the trend note (omitted
/// when absent), the tabular summary and the question, followed by the
/// instruction to answer from the data.
///
/// # Examples
///
/// ```
/// use sheetqa::prompts::data_prompt::build_data_prompt;
///
/// let prompt = build_data_prompt(None, "3 rows", "Total?");
/// assert!(prompt.ends_with("Answer the question based on the data above."));
/// ```
pub fn build_data_prompt(trend_note: Option<&str>, summary: &str, question: &str) -> String {
    let mut prompt = String::new();
    if let Some(note) = trend_note {
        prompt.push_str(note);
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!(
        "Here is a summary of the uploaded spreadsheet:\n{}\n\nQuestion: {}\n\nAnswer the question based on the data above.",
        summary.trim_end(),
        question.trim()
    ));
    prompt
}
