use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::billing::current_cycle;
use crate::models::{Account, Occurrence, TransactionKind};
use crate::money::Money;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub income: Money,
    pub expense: Money,
}

impl Totals {
    /// Income and expense across all occurrences, regardless of account.
    /// Transfers move money between accounts and are never counted.
    pub fn of(occurrences: &[Occurrence]) -> Self {
        let mut totals = Self::default();
        for occ in occurrences {
            let amount = occ.amount.non_negative();
            if occ.kind.is_income() {
                totals.income += amount;
            } else if occ.kind.is_expense_like() {
                totals.expense += amount;
            }
        }
        totals
    }

    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub balances: BTreeMap<i64, Money>,
    /// Current open invoice per credit card with a closing day.
    pub invoices: BTreeMap<i64, Money>,
    pub totals: Totals,
}

impl Aggregation {
    pub fn balance(&self, account_id: i64) -> Money {
        self.balances.get(&account_id).copied().unwrap_or_default()
    }

    pub fn invoice(&self, account_id: i64) -> Option<Money> {
        self.invoices.get(&account_id).copied()
    }

    /// Card limit minus the open invoice; `None` for bank accounts.
    pub fn available_credit(&self, account: &Account) -> Option<Money> {
        if !account.is_credit_card() {
            return None;
        }
        let limit = account.card_limit.unwrap_or_default();
        Some(limit - self.invoice(account.id).unwrap_or_default())
    }
}

/// Whether an occurrence on a credit card accrues to its invoice: explicit
/// card expenses, and installment expenses booked to the card.
pub fn is_card_expense_like(occ: &Occurrence) -> bool {
    match occ.kind {
        TransactionKind::CardExpense => true,
        TransactionKind::Expense { .. } => occ.is_installment(),
        _ => false,
    }
}

/// Fold occurrences into per-account balances, open-invoice totals and global
/// income/expense totals.
///
/// Balances start at each account's initial balance. Income adds, expenses
/// subtract, transfers move the amount from source to destination. Occurrences
/// on accounts not in `accounts` still count toward the global totals.
pub fn aggregate(accounts: &[Account], occurrences: &[Occurrence], as_of: NaiveDate) -> Aggregation {
    let mut balances: BTreeMap<i64, Money> = accounts
        .iter()
        .map(|a| (a.id, a.initial_balance))
        .collect();

    for occ in occurrences {
        let amount = occ.amount.non_negative();
        match occ.kind {
            TransactionKind::Income => credit(&mut balances, occ.account_id, amount),
            TransactionKind::Expense { .. } | TransactionKind::CardExpense => {
                credit(&mut balances, occ.account_id, -amount)
            }
            TransactionKind::Transfer { to_account_id } => {
                credit(&mut balances, occ.account_id, -amount);
                credit(&mut balances, to_account_id, amount);
            }
        }
    }

    let mut invoices = BTreeMap::new();
    for account in accounts {
        let Some(closing_day) = account.billing_closing_day() else {
            continue;
        };
        let cycle = current_cycle(closing_day, as_of);
        let total: Money = occurrences
            .iter()
            .filter(|o| o.account_id == Some(account.id))
            .filter(|o| is_card_expense_like(o) && cycle.contains(o.date))
            .map(|o| o.amount.non_negative())
            .sum();
        invoices.insert(account.id, total);
    }

    Aggregation {
        balances,
        invoices,
        totals: Totals::of(occurrences),
    }
}

fn credit(balances: &mut BTreeMap<i64, Money>, account_id: Option<i64>, amount: Money) {
    if let Some(balance) = account_id.and_then(|id| balances.get_mut(&id)) {
        *balance += amount;
    }
}

#[cfg(test)]
#[path = "balance_tests.rs"]
mod tests;
