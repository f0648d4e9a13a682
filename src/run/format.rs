use rust_decimal::Decimal;

use crate::money::Money;

/// Format an amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"$1,234,567.89"`
pub(crate) fn format_amount(val: Money) -> String {
    let formatted = val.abs().to_string();
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

    if val.is_negative() && formatted != "0.00" {
        format!("-${with_commas}.{dec_part}")
    } else {
        format!("${with_commas}.{dec_part}")
    }
}

/// Like `format_amount`, with an explicit `+` on increases.
pub(crate) fn format_change(val: Money) -> String {
    if val.is_positive() {
        format!("+{}", format_amount(val))
    } else {
        format_amount(val)
    }
}

pub(crate) fn format_pct(pct: Option<Decimal>) -> String {
    match pct {
        Some(p) if p > Decimal::ZERO => format!("+{p:.2}%"),
        Some(p) => format!("{p:.2}%"),
        None => "n/a".into(),
    }
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// The result is guaranteed to be at most `max` characters (counting "…" as one).
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{truncated}…")
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
