use console::style;
use std::fmt::Display;

/// Green bold: completed stages, confirmations
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// White bold: section headers
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: timestamps, secondary text
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow: safety issues, warnings
pub fn warning<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Red bold: failures
pub fn failure<D: Display>(text: D) -> String {
    style(text).red().bold().to_string()
}

/// Green: prompts, ids, paths
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan bold: bullets, agent names
pub fn accent<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}

/// Cyan: field labels
pub fn label<D: Display>(text: D) -> String {
    style(text).cyan().to_string()
}

/// Colour a 0..1 score the way the dashboard bands it: green from 0.8,
/// yellow from 0.6, red below.
pub fn score(value: f64) -> String {
    let text = format!("{:.0}%", value * 100.0);
    if value >= 0.8 {
        style(text).green().to_string()
    } else if value >= 0.6 {
        style(text).yellow().to_string()
    } else {
        style(text).red().to_string()
    }
}
