//! Prompt construction for completion requests
//!
//! Two prompt shapes are sent to the completion service: the data-grounded
//! question prompt and the fixed formula-explanation template, which needs
//! no data at all.

pub mod data_prompt;
pub mod formula_prompt;

pub use data_prompt::build_data_prompt;
pub use formula_prompt::formula_explanation_prompt;

use crate::context::GroundingContext;

/// Builds the prompt for a question about a dataset
///
/// # Examples
///
/// ```
/// use sheetqa::context::GroundingContext;
/// use sheetqa::prompts::build_question_prompt;
///
/// let context = GroundingContext { summary: "The dataset has 2 rows".into(), trend: None };
/// let prompt = build_question_prompt(&context, "What changed?");
/// assert!(prompt.contains("The dataset has 2 rows"));
/// assert!(prompt.contains("What changed?"));
/// ```
pub fn build_question_prompt(context: &GroundingContext, question: &str) -> String {
    build_data_prompt(context.trend_note().as_deref(), &context.summary, question)
}
