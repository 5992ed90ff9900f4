use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::budget::Allocation;
use crate::models::AllocationMode;

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"1,234,567.89"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let abs = val.abs().round_dp(2);
    let formatted = format!("{abs:.2}");
    let mut parts = formatted.split('.');
    let int_part = parts.next().unwrap_or("0");
    let dec_part = parts.next().unwrap_or("00");

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    if val.round_dp(2) < Decimal::ZERO {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// What the user typed for a line, as it should be shown back.
/// Automatic lines have no input.
pub(crate) fn format_input(mode: AllocationMode, allocation: Allocation) -> String {
    match allocation {
        Allocation::Automatic => "Auto".to_string(),
        Allocation::Manual(value) => format_value(mode, value),
    }
}

pub(crate) fn format_value(mode: AllocationMode, value: Decimal) -> String {
    match mode {
        AllocationMode::Percentage => format!("{}%", value.normalize()),
        AllocationMode::Absolute => format_amount(value),
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

/// `spent / budgeted` as a float for drawing, clamped to `[0, 1]`.
pub(crate) fn usage_ratio(spent: Decimal, budgeted: Decimal) -> f64 {
    if budgeted <= Decimal::ZERO {
        return if spent > Decimal::ZERO { 1.0 } else { 0.0 };
    }
    spent
        .checked_div(budgeted)
        .and_then(|ratio| ratio.to_f64())
        .unwrap_or(1.0)
        .clamp(0.0, 1.0)
}

pub(crate) fn progress_bar(ratio: f64, width: usize) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    let empty = width - filled;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Move a list cursor down by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 < len {
        *index += 1;
        if *index >= *scroll + page {
            *scroll = index.saturating_sub(page.saturating_sub(1));
        }
    }
}

/// Move a list cursor up by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    if *index < *scroll {
        *scroll = *index;
    }
}
