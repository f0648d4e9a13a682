//! Folds projected occurrences into balances, invoices and monthly summaries.

pub mod balance;
pub mod summary;

pub use balance::{aggregate, is_card_expense_like, Aggregation, Totals};
pub use summary::{
    by_category, by_month, compare_months, group_by_month, CategoryTotal, MonthComparison,
    MonthSummary, UNCATEGORIZED,
};
