//! Heuristic answerers
//!
//! Deterministic rules tried before any completion request. Each rule is a
//! pure function that returns `None` on a miss so the engine can fall
//! through to the next step.

use crate::dataset::{format_float, Dataset};
use crate::prompts;

const NET_INCOME: &str = "net income";
const REVENUE: &str = "revenue";
const FORMULA_PHRASE: &str = "how do i calculate";
const EXCEL: &str = "excel";

/// Answer produced by the net income / revenue ratio rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatioAnswer {
    /// sum(net income) / sum(revenue), rounded to 4 decimal places
    pub ratio: f64,
}

impl RatioAnswer {
    /// User-facing sentence for the ratio
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::heuristics::RatioAnswer;
    ///
    /// let answer = RatioAnswer { ratio: 0.25 };
    /// assert_eq!(answer.sentence(), "The Net Income to Revenue ratio is 0.25.");
    /// ```
    pub fn sentence(&self) -> String {
        format!(
            "The Net Income to Revenue ratio is {}.",
            format_float(self.ratio)
        )
    }
}

/// Build the formula-explanation prompt if the question asks how to
/// calculate something in Excel
///
/// Triggers when the lower-cased question contains both
/// "how do i calculate" and "excel". The dataset is not consulted.
///
/// # Examples
///
/// ```
/// use sheetqa::heuristics::formula_explanation_request;
///
/// let prompt = formula_explanation_request("How do I calculate XYZ in excel?").unwrap();
/// assert_eq!(
///     prompt,
///     "Explain the Excel formula to calculate: 'How do I calculate XYZ in excel?'. Provide the exact formula."
/// );
/// assert!(formula_explanation_request("What is XYZ?").is_none());
/// ```
pub fn formula_explanation_request(question: &str) -> Option<String> {
    let lowered = question.to_lowercase();
    if lowered.contains(FORMULA_PHRASE) && lowered.contains(EXCEL) {
        Some(prompts::formula_explanation_prompt(question))
    } else {
        None
    }
}

/// Compute the net income to revenue ratio when the question asks for it
///
/// Triggers when the lower-cased question mentions both "net income" and
/// "revenue" and the dataset has columns with exactly those names (case
/// and surrounding whitespace ignored). Non-numeric columns and a zero
/// revenue total are misses.
pub fn net_income_ratio(dataset: &Dataset, question: &str) -> Option<RatioAnswer> {
    let lowered = question.to_lowercase();
    if !(lowered.contains(NET_INCOME) && lowered.contains(REVENUE)) {
        return None;
    }

    let net_income = dataset.column_ignore_case(NET_INCOME)?.numeric_sum()?;
    let revenue = dataset.column_ignore_case(REVENUE)?.numeric_sum()?;
    if revenue == 0.0 {
        tracing::debug!("Ratio heuristic skipped: revenue total is zero");
        return None;
    }

    let ratio = net_income / revenue;
    if !ratio.is_finite() {
        return None;
    }

    Some(RatioAnswer {
        ratio: round_to(ratio, 4),
    })
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};

    fn finance(net: Vec<Value>, revenue: Vec<Value>) -> Dataset {
        Dataset::new(
            "P&L",
            vec![
                Column::new("Net Income", net),
                Column::new("Revenue", revenue),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_ratio_rounds_to_four_places() {
        let ds = finance(
            vec![Value::Int(10), Value::Int(20)],
            vec![Value::Int(70), Value::Int(20)],
        );
        let answer = net_income_ratio(&ds, "What is NET INCOME over Revenue?").unwrap();
        assert_eq!(answer.ratio, 0.3333);
        assert_eq!(answer.sentence(), "The Net Income to Revenue ratio is 0.3333.");
    }

    #[test]
    fn test_ratio_requires_both_phrases() {
        let ds = finance(vec![Value::Int(1)], vec![Value::Int(2)]);
        assert!(net_income_ratio(&ds, "What is the revenue?").is_none());
        assert!(net_income_ratio(&ds, "Show net income").is_none());
    }

    #[test]
    fn test_ratio_requires_matching_columns() {
        let ds = Dataset::new(
            "P&L",
            vec![
                Column::new("Net Income (USD)", vec![Value::Int(1)]),
                Column::new("Revenue", vec![Value::Int(2)]),
            ],
        )
        .unwrap();
        assert!(net_income_ratio(&ds, "net income vs revenue").is_none());
    }

    #[test]
    fn test_ratio_zero_revenue_is_miss() {
        let ds = finance(vec![Value::Int(5)], vec![Value::Int(0)]);
        assert!(net_income_ratio(&ds, "net income to revenue").is_none());
    }

    #[test]
    fn test_ratio_non_numeric_is_miss() {
        let ds = finance(vec![Value::Text("n/a".into())], vec![Value::Int(3)]);
        assert!(net_income_ratio(&ds, "net income to revenue").is_none());
    }

    #[test]
    fn test_ratio_skips_empty_cells() {
        let ds = finance(
            vec![Value::Float(1.5), Value::Null],
            vec![Value::Int(4), Value::Int(2)],
        );
        let answer = net_income_ratio(&ds, "net income / revenue").unwrap();
        assert_eq!(answer.ratio, 0.25);
    }

    #[test]
    fn test_whole_ratio_reads_as_decimal() {
        let ds = finance(vec![Value::Int(40)], vec![Value::Int(40)]);
        let answer = net_income_ratio(&ds, "net income vs revenue").unwrap();
        assert_eq!(answer.sentence(), "The Net Income to Revenue ratio is 1.0.");
    }

    #[test]
    fn test_formula_request_case_insensitive() {
        assert!(formula_explanation_request("HOW DO I CALCULATE margin in EXCEL").is_some());
        assert!(formula_explanation_request("how do i calculate margin").is_none());
        assert!(formula_explanation_request("excel tips").is_none());
    }
}
