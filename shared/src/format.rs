//! Display formatting for amounts and dates
//!
//! Stored values keep full precision; these helpers only shape what a user
//! reads on screen or in an export header.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Rupee sign used by [`format_inr`]
pub const RUPEE_SIGN: char = '₹';

/// Format an amount as Indian rupees with en-IN digit grouping and no
/// fractional digits, e.g. `₹12,34,567` or `-₹1,235`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let mut out = String::with_capacity(digits.len() + 8);
    if negative {
        out.push('-');
    }
    out.push(RUPEE_SIGN);
    out.push_str(&group_indian(&digits));
    out
}

/// Apply Indian digit grouping: the last three digits, then pairs.
pub fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Format a date the way report headers show it, e.g. `5 Jan 2024`
pub fn format_report_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}
