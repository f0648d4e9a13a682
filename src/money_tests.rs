#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal_macros::dec;

fn m(d: Decimal) -> Money {
    Money::new(d)
}

// ── Arithmetic ────────────────────────────────────────────────

#[test]
fn test_add_sub_neg() {
    assert_eq!(m(dec!(0.10)) + m(dec!(0.20)), m(dec!(0.30)));
    assert_eq!(m(dec!(10.00)) - m(dec!(12.50)), m(dec!(-2.50)));
    assert_eq!(-m(dec!(3.00)), m(dec!(-3.00)));

    let mut acc = Money::ZERO;
    acc += m(dec!(1.01));
    acc -= m(dec!(0.01));
    assert_eq!(acc, m(dec!(1.00)));
}

#[test]
fn test_sum_is_exact() {
    let parts = vec![m(dec!(0.1)); 10];
    let total: Money = parts.iter().sum();
    assert_eq!(total, m(dec!(1.0)));
}

#[test]
fn test_from_cents() {
    assert_eq!(Money::from_cents(1099), m(dec!(10.99)));
    assert_eq!(Money::from_cents(-550), m(dec!(-5.50)));
}

#[test]
fn test_non_negative() {
    assert_eq!(m(dec!(-4.20)).non_negative(), Money::ZERO);
    assert_eq!(m(dec!(4.20)).non_negative(), m(dec!(4.20)));
    assert_eq!(Money::ZERO.non_negative(), Money::ZERO);
}

#[test]
fn test_comparison() {
    assert!(m(dec!(1.00)) < m(dec!(1.01)));
    assert!(m(dec!(-1)) < Money::ZERO);
    assert!(m(dec!(2)).is_positive());
    assert!(m(dec!(-2)).is_negative());
    assert!(!Money::ZERO.is_negative());
}

// ── Division ──────────────────────────────────────────────────

#[test]
fn test_div_round_modes() {
    let ten = m(dec!(10.00));
    assert_eq!(ten.div_round(dec!(3), 2, Rounding::Down), m(dec!(3.33)));
    assert_eq!(ten.div_round(dec!(3), 2, Rounding::HalfUp), m(dec!(3.33)));
    assert_eq!(
        m(dec!(20.00)).div_round(dec!(3), 2, Rounding::HalfUp),
        m(dec!(6.67))
    );
    assert_eq!(
        m(dec!(20.00)).div_round(dec!(3), 2, Rounding::Down),
        m(dec!(6.66))
    );
}

#[test]
fn test_div_by_zero_is_zero() {
    assert_eq!(m(dec!(5)).div(Decimal::ZERO), Money::ZERO);
    assert_eq!(
        m(dec!(5)).div_round(Decimal::ZERO, 2, Rounding::Down),
        Money::ZERO
    );
}

#[test]
fn test_div_floor() {
    assert_eq!(div_floor(dec!(100), dec!(30), 0), dec!(3));
    assert_eq!(div_floor(dec!(100), dec!(30), 2), dec!(3.33));
    assert_eq!(div_floor(dec!(1), dec!(3), 8), dec!(0.33333333));
    assert_eq!(div_floor(dec!(100), Decimal::ZERO, 2), Decimal::ZERO);
    assert_eq!(div_floor(dec!(100), dec!(-1), 2), Decimal::ZERO);
}

// ── Installment split ─────────────────────────────────────────

#[test]
fn test_split_even() {
    let parts = m(dec!(1200.00)).split(3);
    assert_eq!(parts, vec![m(dec!(400.00)); 3]);
}

#[test]
fn test_split_remainder_on_last() {
    let parts = m(dec!(1000.01)).split(3);
    assert_eq!(
        parts,
        vec![m(dec!(333.34)), m(dec!(333.34)), m(dec!(333.33))]
    );
    assert_eq!(parts.iter().sum::<Money>(), m(dec!(1000.01)));
}

#[test]
fn test_split_truncates_when_rounding_would_overshoot() {
    let parts = m(dec!(0.05)).split(10);
    assert!(parts.iter().all(|p| !p.is_negative()));
    assert_eq!(parts.iter().sum::<Money>(), m(dec!(0.05)));
    assert_eq!(parts[9], m(dec!(0.05)));
}

#[test]
fn test_split_conserves_awkward_totals() {
    for (total, n) in [
        (dec!(100.00), 7u32),
        (dec!(99.99), 12),
        (dec!(0.01), 3),
        (dec!(1234.56), 24),
        (dec!(7.77), 1),
    ] {
        let parts = m(total).split(n);
        assert_eq!(parts.len(), n as usize);
        assert_eq!(parts.iter().sum::<Money>(), m(total), "{total} / {n}");
    }
}

#[test]
fn test_split_zero_parts() {
    assert!(m(dec!(10)).split(0).is_empty());
}

// ── Parsing & display ─────────────────────────────────────────

#[test]
fn test_parse_lenient() {
    assert_eq!(Money::parse_lenient("$1,234.56"), m(dec!(1234.56)));
    assert_eq!(Money::parse_lenient("(500.00)"), m(dec!(-500.00)));
    assert_eq!(Money::parse_lenient("\"42\""), m(dec!(42)));
    assert_eq!(Money::parse_lenient(""), Money::ZERO);
    assert_eq!(Money::parse_lenient("NaN"), Money::ZERO);
    assert_eq!(Money::parse_lenient("inf"), Money::ZERO);
}

#[test]
fn test_parse_lenient_decimal_comma() {
    assert_eq!(Money::parse_lenient("89,90"), m(dec!(89.90)));
    assert_eq!(Money::parse_lenient("1.234,56"), m(dec!(1234.56)));
    assert_eq!(Money::parse_lenient("R$ 1.234,56"), m(dec!(1234.56)));
    assert_eq!(Money::parse_lenient("-12,5"), m(dec!(-12.5)));
    assert_eq!(Money::parse_lenient("(1.000,00)"), m(dec!(-1000.00)));
}

#[test]
fn test_parse_lenient_comma_grouping_kept() {
    assert_eq!(Money::parse_lenient("1,234"), m(dec!(1234)));
    assert_eq!(Money::parse_lenient("1,234,567.8"), m(dec!(1234567.8)));
    assert_eq!(Money::parse_lenient("12.50"), m(dec!(12.50)));
}

#[test]
fn test_from_str_strict() {
    assert_eq!("12.30".parse::<Money>().unwrap(), m(dec!(12.30)));
    assert!("$12".parse::<Money>().is_err());
}

#[test]
fn test_display_two_places() {
    assert_eq!(m(dec!(400)).to_string(), "400.00");
    assert_eq!(m(dec!(333.335)).to_string(), "333.34");
    assert_eq!(m(dec!(-0.5)).to_string(), "-0.50");
}
