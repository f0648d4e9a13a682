//! Per-user façade over the record store: reads go through the month cache,
//! writes go to the store and drop the user's cached months.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use tracing::info;

use crate::aggregate::{aggregate, compare_months, is_card_expense_like, MonthComparison, MonthSummary, Totals};
use crate::billing::{current_cycle, BillingCycle};
use crate::cache::MonthCache;
use crate::calendar::YearMonth;
use crate::db::Database;
use crate::import::{import_file, CardExpenseClassifier, SkippedRow};
use crate::investment::{quantity_for_cash, CashPurchase};
use crate::models::{Account, InvestmentAsset, Occurrence, Purchase, Transaction};
use crate::money::Money;
use crate::projector::{expand, project, project_range};

#[derive(Debug, Clone, PartialEq)]
pub struct AccountView {
    pub account: Account,
    /// Initial balance plus every occurrence dated on or before the as-of date.
    pub balance: Money,
    pub invoice: Option<Money>,
    pub available_credit: Option<Money>,
    pub cycle: Option<BillingCycle>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub as_of: NaiveDate,
    pub accounts: Vec<AccountView>,
    /// Income and expense of the as-of month.
    pub month_totals: Totals,
    pub comparison: MonthComparison,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub account: Account,
    pub cycle: BillingCycle,
    pub due_date: Option<NaiveDate>,
    /// Sorted by date.
    pub items: Vec<Occurrence>,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: Vec<SkippedRow>,
}

pub struct Ledger {
    db: Database,
    summaries: MonthCache<MonthSummary>,
}

impl Ledger {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            summaries: MonthCache::new(),
        }
    }

    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn cached_months(&self) -> usize {
        self.summaries.len()
    }

    // ── Reads ─────────────────────────────────────────────────

    pub fn month_summary(&mut self, user_id: i64, month: YearMonth) -> Result<&MonthSummary> {
        let db = &self.db;
        self.summaries.get_or_try_load(user_id, month, || {
            let txns = db.get_transactions_affecting(user_id, month)?;
            Ok(MonthSummary::new(month, project(&txns, month)))
        })
    }

    /// The `months` months ending at `current`, most recent first.
    pub fn trend(&mut self, user_id: i64, months: u32, current: YearMonth) -> Result<Vec<MonthSummary>> {
        let mut out = Vec::with_capacity(months as usize);
        for back in 0..i64::from(months) {
            let Some(month) = current.offset(-back) else {
                break;
            };
            out.push(self.month_summary(user_id, month)?.clone());
        }
        Ok(out)
    }

    pub fn dashboard(&mut self, user_id: i64, as_of: NaiveDate) -> Result<Dashboard> {
        let accounts = self.db.get_accounts(user_id)?;
        let all = expand(&self.db.get_transactions(user_id)?);
        let to_date: Vec<Occurrence> = all.iter().filter(|o| o.date <= as_of).cloned().collect();

        let settled = aggregate(&accounts, &to_date, as_of);
        let open = aggregate(&accounts, &all, as_of);

        let views: Vec<AccountView> = accounts
            .into_iter()
            .map(|account| {
                let cycle = account.billing_closing_day().map(|day| current_cycle(day, as_of));
                let due_date = cycle.zip(account.due_day).map(|(c, due)| c.due_date(due));
                AccountView {
                    balance: settled.balance(account.id),
                    invoice: open.invoice(account.id),
                    available_credit: open.available_credit(&account),
                    cycle,
                    due_date,
                    account,
                }
            })
            .collect();

        let month = YearMonth::of(as_of);
        let current = self.month_summary(user_id, month)?.clone();
        let previous = self.month_summary(user_id, month.pred())?;
        let comparison = compare_months(&current, previous);

        Ok(Dashboard {
            as_of,
            accounts: views,
            month_totals: Totals {
                income: current.income,
                expense: current.expense,
            },
            comparison,
        })
    }

    /// The open invoice of a credit card on `as_of`.
    pub fn invoice(&self, user_id: i64, account_id: i64, as_of: NaiveDate) -> Result<Invoice> {
        let account = self
            .db
            .get_account(user_id, account_id)?
            .with_context(|| format!("Account {account_id} not found"))?;
        let Some(closing_day) = account.billing_closing_day() else {
            bail!("Account '{}' is not a credit card with a closing day", account.name);
        };
        let cycle = current_cycle(closing_day, as_of);
        let (from, to) = cycle.month_span();

        let txns = self.db.get_transactions(user_id)?;
        let mut items: Vec<Occurrence> = project_range(&txns, from, to)
            .into_iter()
            .filter(|o| o.account_id == Some(account_id))
            .filter(|o| is_card_expense_like(o) && cycle.contains(o.date))
            .collect();
        items.sort_by_key(|o| o.date);
        let total: Money = items.iter().map(|o| o.amount.non_negative()).sum();

        Ok(Invoice {
            due_date: account.due_day.map(|d| cycle.due_date(d)),
            account,
            cycle,
            items,
            total,
        })
    }

    // ── Writes ────────────────────────────────────────────────

    pub fn add_account(&mut self, user_id: i64, account: &Account) -> Result<i64> {
        let id = self.db.insert_account(user_id, account)?;
        self.summaries.invalidate_user(user_id);
        Ok(id)
    }

    pub fn add_transaction(&mut self, user_id: i64, txn: &Transaction) -> Result<i64> {
        let id = self.db.apply_transaction(user_id, txn)?;
        self.summaries.invalidate_user(user_id);
        Ok(id)
    }

    pub fn import(
        &mut self,
        user_id: i64,
        path: &Path,
        classifier: &CardExpenseClassifier,
    ) -> Result<ImportOutcome> {
        let report = import_file(path, classifier)?;
        let inserted = self.db.insert_transactions_batch(user_id, &report.transactions)?;
        self.summaries.invalidate_user(user_id);
        let outcome = ImportOutcome {
            inserted,
            duplicates: report.transactions.len() - inserted,
            skipped: report.skipped,
        };
        info!(
            user = user_id,
            path = %path.display(),
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            skipped = outcome.skipped.len(),
            "legacy import finished"
        );
        Ok(outcome)
    }

    pub fn pay_installment(&mut self, user_id: i64, txn_id: i64) -> Result<Option<Money>> {
        let paid = self.db.mark_installment_paid(user_id, txn_id)?;
        self.summaries.invalidate_user(user_id);
        Ok(paid)
    }

    /// Spend up to `cash` on an asset at `price`, recording the purchase.
    pub fn buy(
        &mut self,
        user_id: i64,
        asset_id: i64,
        cash: Money,
        price: Money,
        date: NaiveDate,
    ) -> Result<(CashPurchase, InvestmentAsset)> {
        let asset = self
            .db
            .get_asset(user_id, asset_id)?
            .with_context(|| format!("Asset {asset_id} not found"))?;
        let order = match quantity_for_cash(asset.asset_type, cash, price) {
            Some(order) if order.quantity > rust_decimal::Decimal::ZERO => order,
            _ => bail!("{cash} buys no {} at {price}", asset.symbol),
        };
        let purchase = Purchase::new(asset_id, date, price, order.quantity);
        let updated = self.db.record_purchase(user_id, &purchase)?;
        self.summaries.invalidate_user(user_id);
        Ok((order, updated))
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
