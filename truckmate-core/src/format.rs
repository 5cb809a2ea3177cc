//! Formatting helpers shared across UIs.

use chrono::{DateTime, Local, Utc};

use crate::types::UrgencyLevel;

/// Currency symbol used for repair cost estimates.
pub const CURRENCY_SYMBOL: &str = "₱";

/// Placeholder for absent values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Severity score scale shown beside an assessment.
pub const SEVERITY_SCALE: [(&str, &str); 4] = [
    ("1-3", "Minor damage"),
    ("4-6", "Moderate damage"),
    ("7-8", "Significant damage"),
    ("9-10", "Critical damage"),
];

/// Priority score scale shown beside an assessment.
pub const PRIORITY_SCALE: [(&str, &str); 3] = [
    ("0-3", "Low priority"),
    ("3-7", "Medium priority"),
    ("7-10", "High priority"),
];

/// Two decimals, or `N/A`.
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) => format!("{s:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// `₱1234.50`, or `N/A`.
pub fn format_currency(amount: Option<f64>) -> String {
    match amount {
        Some(a) => format!("{CURRENCY_SYMBOL}{a:.2}"),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_urgency(urgency: Option<UrgencyLevel>) -> String {
    urgency
        .map(|u| u.display_name().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Calendar date in the local timezone.
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// A block of the backend's free-text assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentSection {
    /// Summary paragraph ("Overall Assessment:", "Explanation:")
    Prose(String),
    /// A damage heading followed by its bullet points
    Damage { title: String, items: Vec<String> },
}

/// Split assessment text on blank lines into prose and damage sections.
pub fn assessment_sections(text: &str) -> Vec<AssessmentSection> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            if block.starts_with("Overall Assessment:") || block.starts_with("Explanation:") {
                return AssessmentSection::Prose(block.to_string());
            }
            let mut lines = block.lines();
            let title = lines.next().unwrap_or_default().trim().to_string();
            let items = lines
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(|line| line.replacen("- ", "", 1))
                .collect();
            AssessmentSection::Damage { title, items }
        })
        .collect()
}

/// Put inline ` - ` bullets on their own lines and split off the closing
/// "This score indicates" sentence as its own paragraph.
pub fn format_priority_explanation(explanation: &str) -> String {
    const MARKER: &str = "This score indicates";

    let (head, tail) = match explanation.find(MARKER) {
        Some(idx) => (&explanation[..idx], Some(&explanation[idx + MARKER.len()..])),
        None => (explanation, None),
    };
    let head = head.replace(": - ", ":\n- ").replace(" - ", "\n- ");
    let head = head.trim_end();

    match tail {
        Some(rest) => format!("{head}\n\n{MARKER}{rest}"),
        None => head.to_string(),
    }
}
