use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::calendar::YearMonth;
use crate::models::{Occurrence, Transaction};
use crate::money::{Money, Rounding};
use crate::projector::{expand, project};

use super::balance::Totals;

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: YearMonth,
    pub income: Money,
    pub expense: Money,
    pub categories: Vec<CategoryTotal>,
    /// Sorted by effective date.
    pub occurrences: Vec<Occurrence>,
}

impl MonthSummary {
    /// Summarize occurrences already known to fall in `month`.
    pub fn new(month: YearMonth, mut occurrences: Vec<Occurrence>) -> Self {
        occurrences.sort_by_key(|o| o.date);
        let totals = Totals::of(&occurrences);
        Self {
            month,
            income: totals.income,
            expense: totals.expense,
            categories: by_category(&occurrences),
            occurrences,
        }
    }

    pub fn net(&self) -> Money {
        self.income - self.expense
    }

    pub fn top_category(&self) -> Option<&CategoryTotal> {
        self.categories.first()
    }
}

/// Expense totals per category, largest first. Ties keep first-seen order.
pub fn by_category(occurrences: &[Occurrence]) -> Vec<CategoryTotal> {
    let mut out: Vec<CategoryTotal> = Vec::new();
    for occ in occurrences.iter().filter(|o| o.kind.is_expense_like()) {
        let name = category_name(occ.category.as_deref());
        let amount = occ.amount.non_negative();
        match out.iter_mut().find(|c| c.category == name) {
            Some(entry) => {
                entry.total += amount;
                entry.count += 1;
            }
            None => out.push(CategoryTotal {
                category: name.to_string(),
                total: amount,
                count: 1,
            }),
        }
    }
    // sort_by is stable
    out.sort_by(|a, b| b.total.cmp(&a.total));
    out
}

fn category_name(raw: Option<&str>) -> &str {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => UNCATEGORIZED,
    }
}

/// The `months_back` months ending at `current`, most recent first. Months
/// without activity are still present with zero totals.
pub fn by_month(
    transactions: &[Transaction],
    months_back: u32,
    current: YearMonth,
) -> Vec<MonthSummary> {
    (0..i64::from(months_back))
        .filter_map(|back| current.offset(-back))
        .map(|month| MonthSummary::new(month, project(transactions, month)))
        .collect()
}

/// Every month touched by at least one occurrence, most recent first. Each
/// occurrence lands in exactly one bucket.
pub fn group_by_month(transactions: &[Transaction]) -> Vec<MonthSummary> {
    let mut buckets: BTreeMap<YearMonth, Vec<Occurrence>> = BTreeMap::new();
    for occ in expand(transactions) {
        buckets.entry(occ.month()).or_default().push(occ);
    }
    buckets
        .into_iter()
        .rev()
        .map(|(month, occurrences)| MonthSummary::new(month, occurrences))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthComparison {
    pub month: YearMonth,
    pub previous: YearMonth,
    /// Current minus previous expense; positive means more spending.
    pub expense_change: Money,
    /// Change relative to the previous month, in percent with two decimals.
    /// `None` when the previous month had no expenses.
    pub expense_change_pct: Option<Decimal>,
    pub top_category: Option<CategoryTotal>,
}

pub fn compare_months(current: &MonthSummary, previous: &MonthSummary) -> MonthComparison {
    let expense_change = current.expense - previous.expense;
    let expense_change_pct = if previous.expense.is_positive() {
        Some(
            expense_change
                .times(Decimal::ONE_HUNDRED)
                .div_round(previous.expense.amount(), 2, Rounding::HalfUp)
                .amount(),
        )
    } else {
        None
    };
    MonthComparison {
        month: current.month,
        previous: previous.month,
        expense_change,
        expense_change_pct,
        top_category: current.top_category().cloned(),
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
