#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

fn m(d: Decimal) -> Money {
    Money::new(d)
}

// ── truncate ──────────────────────────────────────────────────

#[test]
fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello", 5), "hello");
}

#[test]
fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 5), "hell…");
}

#[test]
fn test_truncate_zero_max() {
    assert_eq!(truncate("hello", 0), "");
}

#[test]
fn test_truncate_multibyte() {
    assert_eq!(truncate("Cartão de crédito", 8), "Cartão …");
    assert_eq!(truncate("café", 4), "café");
}

// ── format_amount ─────────────────────────────────────────────

#[test]
fn test_format_amount_basic() {
    assert_eq!(format_amount(m(dec!(1234.56))), "$1,234.56");
    assert_eq!(format_amount(m(dec!(1234567.89))), "$1,234,567.89");
}

#[test]
fn test_format_amount_small_and_zero() {
    assert_eq!(format_amount(m(dec!(5))), "$5.00");
    assert_eq!(format_amount(Money::ZERO), "$0.00");
    assert_eq!(format_amount(m(dec!(999.999))), "$1,000.00");
}

#[test]
fn test_format_amount_negative() {
    assert_eq!(format_amount(m(dec!(-42000.5))), "-$42,000.50");
}

#[test]
fn test_format_amount_negative_rounding_to_zero() {
    assert_eq!(format_amount(m(dec!(-0.001))), "$0.00");
}

// ── format_change / format_pct ────────────────────────────────

#[test]
fn test_format_change_sign() {
    assert_eq!(format_change(m(dec!(200))), "+$200.00");
    assert_eq!(format_change(m(dec!(-200))), "-$200.00");
    assert_eq!(format_change(Money::ZERO), "$0.00");
}

#[test]
fn test_format_pct() {
    assert_eq!(format_pct(Some(dec!(12.5))), "+12.50%");
    assert_eq!(format_pct(Some(dec!(-33.33))), "-33.33%");
    assert_eq!(format_pct(None), "n/a");
}
