//! Expands stored transactions into the occurrences that land in a month.

use chrono::NaiveDate;
use tracing::debug;

use crate::calendar::{add_months_clamped, YearMonth};
use crate::models::{Occurrence, Transaction, TransactionKind};

/// All occurrences of `transactions` whose effective date falls in `month`.
///
/// Pure: the same inputs always give the same occurrences, in transaction
/// order. A transaction with an unparseable date contributes nothing.
pub fn project(transactions: &[Transaction], month: YearMonth) -> Vec<Occurrence> {
    transactions
        .iter()
        .filter_map(|txn| occurrence_in(txn, month))
        .collect()
}

/// Occurrences for every month in `from..=to`, month by month.
pub fn project_range(
    transactions: &[Transaction],
    from: YearMonth,
    to: YearMonth,
) -> Vec<Occurrence> {
    from.through(to)
        .into_iter()
        .flat_map(|month| project(transactions, month))
        .collect()
}

/// Every occurrence of one transaction, across all the months it touches.
pub fn project_all(txn: &Transaction) -> Vec<Occurrence> {
    let Some(start) = valid_date(txn) else {
        return Vec::new();
    };
    match txn.plan() {
        None => vec![single(txn, start)],
        Some(plan) => (0..plan.total)
            .filter_map(|index| installment(txn, start, index))
            .collect(),
    }
}

/// Every occurrence of every transaction.
pub fn expand(transactions: &[Transaction]) -> Vec<Occurrence> {
    transactions.iter().flat_map(project_all).collect()
}

fn occurrence_in(txn: &Transaction, month: YearMonth) -> Option<Occurrence> {
    let start = valid_date(txn)?;
    match txn.plan() {
        None => month.contains(start).then(|| single(txn, start)),
        Some(plan) => {
            // At most one installment lands in any month, at index = months since start.
            let index = YearMonth::of(start).months_until(month);
            let index = u32::try_from(index).ok().filter(|i| *i < plan.total)?;
            installment(txn, start, index).filter(|occ| month.contains(occ.date))
        }
    }
}

fn valid_date(txn: &Transaction) -> Option<NaiveDate> {
    let date = txn.parsed_date();
    if date.is_none() {
        debug!(transaction = txn.id, date = %txn.date, "skipping transaction with malformed date");
    }
    date
}

fn single(txn: &Transaction, date: NaiveDate) -> Occurrence {
    let paid = match txn.kind {
        TransactionKind::Expense { is_paid } => is_paid,
        _ => true,
    };
    Occurrence {
        source_id: txn.id,
        index: None,
        installment_total: None,
        date,
        amount: txn.amount,
        paid,
        kind: txn.kind,
        account_id: txn.account_id,
        category: txn.category.clone(),
    }
}

fn installment(txn: &Transaction, start: NaiveDate, index: u32) -> Option<Occurrence> {
    let plan = txn.plan()?;
    let date = add_months_clamped(start, index)?;
    Some(Occurrence {
        source_id: txn.id,
        index: Some(index),
        installment_total: Some(plan.total),
        date,
        amount: txn.installment_amount(index),
        paid: index < plan.paid_clamped(),
        kind: txn.kind,
        account_id: txn.account_id,
        category: txn.category.clone(),
    })
}

#[cfg(test)]
#[path = "projector_tests.rs"]
mod tests;
