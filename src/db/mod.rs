mod schema;

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::calendar::{self, YearMonth};
use crate::investment::apply_purchase;
use crate::models::*;
use crate::money::Money;

const TRANSACTION_COLUMNS: &str = "id, kind, amount, date, account_id, to_account_id, category,
     description, installment_total, installments_paid, is_paid";

const ACCOUNT_COLUMNS: &str = "id, name, initial_balance, card_limit, closing_day, due_day";

/// SQLite-backed record store. Every read is scoped to one user.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Accounts ──────────────────────────────────────────────

    /// The persisted running balance starts at the initial balance.
    pub fn insert_account(&self, user_id: i64, account: &Account) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO accounts (user_id, name, initial_balance, balance, card_limit, closing_day, due_day, created_at)
             VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6, ?7)",
            params![
                user_id,
                account.name,
                account.initial_balance.amount().to_string(),
                account.card_limit.map(|l| l.amount().to_string()),
                account.closing_day,
                account.due_day,
                now(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(user = user_id, account = id, name = %account.name, "account created");
        Ok(id)
    }

    pub fn get_accounts(&self, user_id: i64) -> Result<Vec<Account>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE user_id = ?1 ORDER BY name, id"
        ))?;
        let rows = stmt.query_map(params![user_id], account_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_account(&self, user_id: i64, id: i64) -> Result<Option<Account>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                account_from_row,
            )
            .optional()?)
    }

    /// Persisted running balance, as moved by the mutations below.
    pub fn account_balance(&self, user_id: i64, id: i64) -> Result<Money> {
        let balance: Option<String> = self
            .conn
            .query_row(
                "SELECT balance FROM accounts WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        match balance {
            Some(b) => Ok(Money::from_str(&b).unwrap_or_default()),
            None => bail!("Account {id} not found"),
        }
    }

    /// Add `delta` to the persisted balance and return the new balance. The
    /// read and the write happen under the database write lock.
    pub fn adjust_balance(&mut self, user_id: i64, account_id: i64, delta: Money) -> Result<Money> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let balance = adjust_in(&tx, user_id, account_id, delta)?;
        tx.commit()?;
        info!(user = user_id, account = account_id, %delta, %balance, "balance adjusted");
        Ok(balance)
    }

    // ── Transactions ──────────────────────────────────────────

    /// Store a transaction without touching any balance.
    pub fn insert_transaction(&self, user_id: i64, txn: &Transaction) -> Result<i64> {
        insert_txn(&self.conn, user_id, txn, "")?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Store a transaction and apply its immediate effect on the persisted
    /// balances in one atomic step.
    ///
    /// Installment transactions and unpaid expenses move no money here;
    /// installments are settled one at a time by `mark_installment_paid`.
    pub fn apply_transaction(&mut self, user_id: i64, txn: &Transaction) -> Result<i64> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        insert_txn(&tx, user_id, txn, "")?;
        let id = tx.last_insert_rowid();
        let settles_now = !txn.is_installment()
            && !matches!(txn.kind, TransactionKind::Expense { is_paid: false });
        if settles_now {
            for (account_id, delta) in balance_effects(&txn.kind, txn.account_id, txn.amount) {
                adjust_in(&tx, user_id, account_id, delta)?;
            }
        }
        tx.commit()?;
        info!(user = user_id, transaction = id, kind = %txn.kind, amount = %txn.amount, "transaction applied");
        Ok(id)
    }

    /// Insert imported transactions, skipping any whose hash was already
    /// imported for this user. Returns how many rows were inserted.
    pub fn insert_transactions_batch(
        &mut self,
        user_id: i64,
        txns: &[(Transaction, String)],
    ) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut count = 0;
        for (txn, hash) in txns {
            if !hash.is_empty() {
                let exists: bool = tx.query_row(
                    "SELECT EXISTS(SELECT 1 FROM transactions WHERE user_id = ?1 AND import_hash = ?2)",
                    params![user_id, hash],
                    |row| row.get(0),
                )?;
                if exists {
                    debug!(user = user_id, hash = %hash, "skipping duplicate import");
                    continue;
                }
            }
            insert_txn(&tx, user_id, txn, hash)?;
            count += 1;
        }
        tx.commit()?;
        Ok(count)
    }

    pub fn get_transactions(&self, user_id: i64) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = ?1 ORDER BY date, id"
        ))?;
        let rows = stmt.query_map(params![user_id], transaction_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Transactions that can have an occurrence in `month`: single events
    /// dated in the month, and installment plans starting on or before it.
    pub fn get_transactions_affecting(&self, user_id: i64, month: YearMonth) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE user_id = ?1 AND date < ?3
               AND (date >= ?2 OR COALESCE(installment_total, 0) > 0)
             ORDER BY date, id"
        ))?;
        let rows = stmt.query_map(
            params![
                user_id,
                month.first_day().format("%Y-%m-%d").to_string(),
                month.succ().first_day().format("%Y-%m-%d").to_string(),
            ],
            transaction_from_row,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_transaction(&self, user_id: i64, id: i64) -> Result<Option<Transaction>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                transaction_from_row,
            )
            .optional()?)
    }

    pub fn transaction_count(&self, user_id: i64) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    /// Settle the next unpaid installment: bump the paid count (never past
    /// the total) and move its amount on the owning account, atomically.
    ///
    /// Returns the settled amount, or `None` when the transaction is not an
    /// installment plan or is already fully paid.
    pub fn mark_installment_paid(&mut self, user_id: i64, txn_id: i64) -> Result<Option<Money>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let txn = tx
            .query_row(
                &format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?1 AND user_id = ?2"),
                params![txn_id, user_id],
                transaction_from_row,
            )
            .optional()?;
        let Some(txn) = txn else {
            bail!("Transaction {txn_id} not found");
        };
        let Some(plan) = txn.plan().filter(|p| !p.is_settled()) else {
            return Ok(None);
        };

        let index = plan.paid_clamped();
        let amount = txn.installment_amount(index);
        tx.execute(
            "UPDATE transactions
             SET installments_paid = MIN(installments_paid + 1, installment_total)
             WHERE id = ?1",
            params![txn_id],
        )?;
        for (account_id, delta) in balance_effects(&txn.kind, txn.account_id, amount) {
            adjust_in(&tx, user_id, account_id, delta)?;
        }
        tx.commit()?;
        info!(
            user = user_id,
            transaction = txn_id,
            installment = index + 1,
            total = plan.total,
            %amount,
            "installment paid"
        );
        Ok(Some(amount))
    }

    // ── Investments ───────────────────────────────────────────

    pub fn insert_asset(&self, user_id: i64, asset_type: AssetType, symbol: &str) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO assets (user_id, asset_type, symbol) VALUES (?1, ?2, ?3)",
                params![user_id, asset_type.as_str(), symbol.trim().to_uppercase()],
            )
            .with_context(|| format!("Failed to create asset {symbol}"))?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_assets(&self, user_id: i64) -> Result<Vec<InvestmentAsset>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, asset_type, symbol, quantity, average_price
             FROM assets WHERE user_id = ?1 ORDER BY symbol",
        )?;
        let rows = stmt.query_map(params![user_id], asset_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn get_asset(&self, user_id: i64, id: i64) -> Result<Option<InvestmentAsset>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, asset_type, symbol, quantity, average_price
                 FROM assets WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                asset_from_row,
            )
            .optional()?)
    }

    /// Append a purchase to the log and fold it into the asset's position.
    /// A rejected purchase leaves both untouched.
    pub fn record_purchase(&mut self, user_id: i64, purchase: &Purchase) -> Result<InvestmentAsset> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let asset = tx
            .query_row(
                "SELECT id, asset_type, symbol, quantity, average_price
                 FROM assets WHERE id = ?1 AND user_id = ?2",
                params![purchase.asset_id, user_id],
                asset_from_row,
            )
            .optional()?;
        let Some(mut asset) = asset else {
            bail!("Asset {} not found", purchase.asset_id);
        };
        apply_purchase(&mut asset, purchase)
            .with_context(|| format!("Cannot record purchase of {}", asset.symbol))?;

        tx.execute(
            "UPDATE assets SET quantity = ?1, average_price = ?2 WHERE id = ?3",
            params![
                asset.quantity.to_string(),
                asset.average_price.amount().to_string(),
                asset.id
            ],
        )?;
        tx.execute(
            "INSERT INTO purchases (asset_id, date, price_per_unit, quantity, total_invested, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                purchase.asset_id,
                purchase.date.format("%Y-%m-%d").to_string(),
                purchase.price_per_unit.amount().to_string(),
                purchase.quantity.to_string(),
                purchase.total_invested.amount().to_string(),
                now(),
            ],
        )?;
        tx.commit()?;
        info!(
            user = user_id,
            asset = %asset.symbol,
            quantity = %purchase.quantity,
            price = %purchase.price_per_unit,
            "purchase recorded"
        );
        Ok(asset)
    }

    pub fn get_purchases(&self, user_id: i64, asset_id: i64) -> Result<Vec<Purchase>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.asset_id, p.date, p.price_per_unit, p.quantity, p.total_invested
             FROM purchases p JOIN assets a ON p.asset_id = a.id
             WHERE p.asset_id = ?1 AND a.user_id = ?2
             ORDER BY p.date, p.id",
        )?;
        let rows = stmt.query_map(params![asset_id, user_id], |row| {
            let date: String = row.get(1)?;
            Ok(Purchase {
                asset_id: row.get(0)?,
                date: calendar::parse_date(&date).ok_or_else(|| invalid_text(1, "date"))?,
                price_per_unit: money_col(row, 2)?,
                quantity: decimal_col(row, 3)?,
                total_invested: money_col(row, 4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }
}

/// Signed per-account effect of moving `amount` for a transaction of `kind`.
fn balance_effects(kind: &TransactionKind, account_id: Option<i64>, amount: Money) -> Vec<(i64, Money)> {
    let amount = amount.non_negative();
    let mut effects = Vec::new();
    match kind {
        TransactionKind::Income => effects.extend(account_id.map(|id| (id, amount))),
        TransactionKind::Expense { .. } | TransactionKind::CardExpense => {
            effects.extend(account_id.map(|id| (id, -amount)))
        }
        TransactionKind::Transfer { to_account_id } => {
            effects.extend(account_id.map(|id| (id, -amount)));
            effects.extend(to_account_id.map(|id| (id, amount)));
        }
    }
    effects
}

fn adjust_in(conn: &Connection, user_id: i64, account_id: i64, delta: Money) -> Result<Money> {
    let current: Option<String> = conn
        .query_row(
            "SELECT balance FROM accounts WHERE id = ?1 AND user_id = ?2",
            params![account_id, user_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(current) = current else {
        bail!("Account {account_id} not found");
    };
    let balance = Money::from_str(&current).unwrap_or_default() + delta;
    conn.execute(
        "UPDATE accounts SET balance = ?1 WHERE id = ?2",
        params![balance.amount().to_string(), account_id],
    )?;
    Ok(balance)
}

fn insert_txn(conn: &Connection, user_id: i64, txn: &Transaction, import_hash: &str) -> Result<()> {
    let (is_paid, to_account_id) = match txn.kind {
        TransactionKind::Expense { is_paid } => (is_paid, None),
        TransactionKind::Transfer { to_account_id } => (false, to_account_id),
        _ => (false, None),
    };
    // Stored canonically so the month prefilter sees what the projector sees.
    // A malformed date is kept verbatim and projects to nothing.
    let date = calendar::parse_date(&txn.date)
        .map_or_else(|| txn.date.clone(), |d| d.format("%Y-%m-%d").to_string());
    conn.execute(
        "INSERT INTO transactions (user_id, kind, amount, date, account_id, to_account_id, category,
                                   description, installment_total, installments_paid, is_paid,
                                   import_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            user_id,
            txn.kind.as_str(),
            txn.amount.amount().to_string(),
            date,
            txn.account_id,
            to_account_id,
            txn.category,
            txn.description,
            txn.installments.map(|p| p.total),
            txn.installments.map_or(0, |p| p.paid),
            is_paid,
            import_hash,
            now(),
        ],
    )
    .with_context(|| format!("Failed to insert transaction dated {}", txn.date))?;
    Ok(())
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let tag: String = row.get(1)?;
    let is_paid: bool = row.get(10)?;
    let to_account_id: Option<i64> = row.get(5)?;
    let kind = TransactionKind::from_parts(&tag, is_paid, to_account_id)
        .ok_or_else(|| invalid_text(1, "kind"))?;
    let total: Option<i64> = row.get(8)?;
    let paid: i64 = row.get(9)?;
    Ok(Transaction {
        id: row.get(0)?,
        kind,
        amount: money_col(row, 2)?,
        date: row.get(3)?,
        account_id: row.get(4)?,
        category: row.get(6)?,
        description: row.get(7)?,
        installments: total.map(|t| {
            InstallmentPlan::new(
                u32::try_from(t).unwrap_or(0),
                u32::try_from(paid).unwrap_or(0),
            )
        }),
    })
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    let card_limit: Option<String> = row.get(3)?;
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        initial_balance: money_col(row, 2)?,
        card_limit: card_limit.map(|l| Money::from_str(&l).unwrap_or_default()),
        closing_day: row.get(4)?,
        due_day: row.get(5)?,
    })
}

fn asset_from_row(row: &Row<'_>) -> rusqlite::Result<InvestmentAsset> {
    let tag: String = row.get(1)?;
    Ok(InvestmentAsset {
        id: row.get(0)?,
        asset_type: AssetType::parse(&tag).ok_or_else(|| invalid_text(1, "asset_type"))?,
        symbol: row.get(2)?,
        quantity: decimal_col(row, 3)?,
        average_price: money_col(row, 4)?,
    })
}

fn money_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Money> {
    let s: String = row.get(idx)?;
    Ok(Money::from_str(&s).unwrap_or_default())
}

fn decimal_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<rust_decimal::Decimal> {
    let s: String = row.get(idx)?;
    Ok(rust_decimal::Decimal::from_str(&s).unwrap_or_default())
}

fn invalid_text(idx: usize, name: &str) -> rusqlite::Error {
    rusqlite::Error::InvalidColumnType(idx, name.to_string(), rusqlite::types::Type::Text)
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests;
