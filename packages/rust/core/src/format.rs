//! Display formatting rules for agreement values.
//!
//! Pure value-to-string functions shared by the context builder and the
//! procedural document builder. Missing-value policy is caller-supplied
//! where the document uses divergent conventions: the members summary
//! table shows [`MONEY_NOT_APPLICABLE`] for an absent commitment while the
//! Article III member table shows [`MONEY_SERVICES`]. The two conventions
//! are deliberate and must not be unified.

use chrono::NaiveDate;

/// Missing-money placeholder used by the members summary table.
pub const MONEY_NOT_APPLICABLE: &str = "N/A";

/// Missing-money placeholder used by the Article III member table: a zero
/// commitment there means the member contributes services.
pub const MONEY_SERVICES: &str = "Services";

/// Placeholder for an unknown principal place of business.
pub const TO_BE_CONFIRMED: &str = "[To be confirmed]";

/// Placeholder for an unknown registered agent.
pub const INSERT_AGENT: &str = "[Insert name & address]";

/// Placeholder for an unstated company purpose.
pub const INSERT_PURPOSE: &str = "[insert purpose]";

/// Format a pound amount with thousands grouping and no decimals
/// (`£50,000`). A zero amount yields the caller's missing-value
/// placeholder.
pub fn money(amount: f64, when_missing: &str) -> String {
    if amount == 0.0 {
        return when_missing.to_string();
    }
    let rounded = amount.round();
    let grouped = group_thousands(rounded.abs() as u64);
    if rounded < 0.0 {
        format!("£-{grouped}")
    } else {
        format!("£{grouped}")
    }
}

/// Format a percentage interest to one decimal place (`12.3%`). Zero is
/// treated as unset and yields `TBD`.
pub fn percentage(value: f64) -> String {
    if value == 0.0 {
        "TBD".to_string()
    } else {
        format!("{value:.1}%")
    }
}

/// Format a date as `{day} {full month name} {year}` (`15 January 2024`).
pub fn long_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// The value when present and non-empty, else the bracketed instructive
/// placeholder.
pub fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    match value {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => placeholder.to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let bytes = digits.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*byte as char);
    }
    grouped
}
