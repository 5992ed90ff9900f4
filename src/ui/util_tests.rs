#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::util::*;
use crate::budget::Allocation;
use crate::models::AllocationMode;

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("Groceries", 20), "Groceries");
    assert_eq!(truncate("Groceries", 9), "Groceries");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("Gifts & Donations", 8), "Gifts &…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("Health", 0), "");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate("Café & Bäckerei", 5), "Café…");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_thousands() {
    assert_eq!(format_amount(dec!(1234567.89)), "$1,234,567.89");
    assert_eq!(format_amount(dec!(999.99)), "$999.99");
}

#[test]
fn test_format_amount_pads_decimals() {
    assert_eq!(format_amount(dec!(0)), "$0.00");
    assert_eq!(format_amount(dec!(1.5)), "$1.50");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(dec!(-1500)), "-$1,500.00");
}

#[test]
fn test_format_amount_tiny_negative_is_zero() {
    assert_eq!(format_amount(dec!(-0.001)), "$0.00");
}

#[test]
fn test_format_amount_long_fraction() {
    // Equal splits of a remainder rarely divide evenly
    let third = dec!(1000) / dec!(3);
    assert_eq!(format_amount(third), "$333.33");
}

// ── inputs ────────────────────────────────────────────────────

#[test]
fn test_format_input() {
    assert_eq!(
        format_input(AllocationMode::Absolute, Allocation::Automatic),
        "Auto"
    );
    assert_eq!(
        format_input(AllocationMode::Percentage, Allocation::Manual(dec!(12.50))),
        "12.5%"
    );
    assert_eq!(
        format_input(AllocationMode::Absolute, Allocation::Manual(dec!(2500))),
        "$2,500.00"
    );
}

// ── progress ──────────────────────────────────────────────────

#[test]
fn test_usage_ratio() {
    assert_eq!(usage_ratio(dec!(50), dec!(200)), 0.25);
    assert_eq!(usage_ratio(dec!(300), dec!(200)), 1.0);
    assert_eq!(usage_ratio(dec!(0), dec!(0)), 0.0);
    assert_eq!(usage_ratio(dec!(10), dec!(0)), 1.0);
}

#[test]
fn test_progress_bar() {
    assert_eq!(progress_bar(0.0, 4), "[░░░░]");
    assert_eq!(progress_bar(0.5, 4), "[██░░]");
    assert_eq!(progress_bar(2.0, 4), "[████]");
}

#[test]
fn test_scroll_keeps_cursor_visible() {
    let (mut index, mut scroll) = (0, 0);
    for _ in 0..5 {
        scroll_down(&mut index, &mut scroll, 10, 3);
    }
    assert_eq!(index, 5);
    assert_eq!(scroll, 3);

    for _ in 0..5 {
        scroll_up(&mut index, &mut scroll);
    }
    assert_eq!((index, scroll), (0, 0));

    let (mut index, mut scroll) = (9, 7);
    scroll_down(&mut index, &mut scroll, 10, 3);
    assert_eq!(index, 9);
}
