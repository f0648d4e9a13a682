use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{Transaction, TransactionKind};
use crate::money::Money;

use super::CardExpenseClassifier;

/// One row of a legacy export, as loosely typed as the file it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyRow {
    /// 1-based line in the file, header included.
    pub line: usize,
    pub date: String,
    pub description: String,
    pub amount: String,
    pub kind: String,
    pub category: String,
    pub account_id: String,
    pub to_account_id: String,
    pub installments: String,
    pub installments_paid: String,
    pub paid: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    /// Each transaction with its dedupe hash.
    pub transactions: Vec<(Transaction, String)>,
    pub skipped: Vec<SkippedRow>,
}

struct Columns {
    date: usize,
    amount: usize,
    kind: usize,
    description: Option<usize>,
    category: Option<usize>,
    account_id: Option<usize>,
    to_account_id: Option<usize>,
    installments: Option<usize>,
    installments_paid: Option<usize>,
    paid: Option<usize>,
}

impl Columns {
    fn detect(headers: &[String]) -> Result<Self> {
        let h: Vec<String> = headers
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        let required = |names: &[&str]| {
            col_index(&h, names).with_context(|| format!("Missing '{}' column", names[0]))
        };
        Ok(Self {
            date: required(&["date", "data"])?,
            amount: required(&["amount", "valor", "value"])?,
            kind: required(&["type", "tipo", "kind"])?,
            description: col_index(&h, &["description", "descricao", "descrição"]),
            category: col_index(&h, &["category", "categoria"]),
            account_id: col_index(&h, &["account_id", "account", "conta"]),
            to_account_id: col_index(&h, &["to_account_id", "to_account", "conta_destino"]),
            installments: col_index(&h, &["installments", "installment_total", "parcelas"]),
            installments_paid: col_index(&h, &["installments_paid", "paid_installments", "parcelas_pagas"]),
            paid: col_index(&h, &["is_paid", "paid", "pago"]),
        })
    }
}

fn col_index(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h.as_str()))
}

pub struct LegacyImporter;

impl LegacyImporter {
    /// Read a legacy CSV export. Columns are located by header name, so
    /// their order does not matter; `date`, `amount` and `type` are required.
    pub fn read(path: &Path) -> Result<Vec<LegacyRow>> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(data.as_slice());

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(|s| s.to_string())
            .collect();
        let cols = Columns::detect(&headers)?;

        let field = |record: &csv::StringRecord, idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result.with_context(|| format!("Failed to read CSV record {}", i + 2))?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            rows.push(LegacyRow {
                line: record.position().map_or(i + 2, |p| line_at(&data, p.byte())),
                date: field(&record, Some(cols.date)),
                description: field(&record, cols.description),
                amount: field(&record, Some(cols.amount)),
                kind: field(&record, Some(cols.kind)),
                category: field(&record, cols.category),
                account_id: field(&record, cols.account_id),
                to_account_id: field(&record, cols.to_account_id),
                installments: field(&record, cols.installments),
                installments_paid: field(&record, cols.installments_paid),
                paid: field(&record, cols.paid),
            });
        }

        if rows.is_empty() {
            bail!("CSV file has no data rows");
        }
        Ok(rows)
    }

    /// Turn legacy rows into explicitly-typed transactions. Rows that cannot
    /// be migrated are reported, never fatal.
    pub fn migrate(rows: &[LegacyRow], classifier: &CardExpenseClassifier) -> ImportReport {
        let mut report = ImportReport::default();
        for row in rows {
            match migrate_row(row, classifier) {
                Ok(migrated) => report.transactions.push(migrated),
                Err(reason) => {
                    warn!(line = row.line, %reason, "skipping legacy row");
                    report.skipped.push(SkippedRow {
                        line: row.line,
                        reason,
                    });
                }
            }
        }
        info!(
            migrated = report.transactions.len(),
            skipped = report.skipped.len(),
            "legacy rows migrated"
        );
        report
    }
}

fn migrate_row(
    row: &LegacyRow,
    classifier: &CardExpenseClassifier,
) -> std::result::Result<(Transaction, String), String> {
    let date = parse_date(&row.date).ok_or_else(|| format!("unparseable date '{}'", row.date))?;
    let signed = Money::parse_lenient(&row.amount);
    if signed.is_zero() {
        return Err(format!("zero or unparseable amount '{}'", row.amount));
    }
    let amount = signed.abs();

    let account_id = parse_id(&row.account_id);
    let kind = match row.kind.trim().to_lowercase().as_str() {
        "income" | "receita" | "entrada" => TransactionKind::Income,
        "transfer" | "transferencia" | "transferência" => TransactionKind::Transfer {
            to_account_id: parse_id(&row.to_account_id),
        },
        "card_expense" | "card" | "cartao" | "cartão" => TransactionKind::CardExpense,
        "expense" | "despesa" | "saida" | "saída" => expense_kind(row, classifier),
        "" if signed.is_negative() => expense_kind(row, classifier),
        "" => TransactionKind::Income,
        other => return Err(format!("unknown type '{other}'")),
    };

    let mut txn = Transaction::new(0, kind, amount, date.format("%Y-%m-%d").to_string());
    txn.account_id = account_id;
    if !row.category.is_empty() {
        txn.category = Some(row.category.clone());
    }
    if !row.description.is_empty() {
        txn.description = Some(row.description.clone());
    }
    if let Some(total) = row.installments.parse::<u32>().ok().filter(|t| *t > 0) {
        let paid = row.installments_paid.parse::<u32>().unwrap_or(0);
        txn = txn.with_installments(total, paid);
    }

    let hash = compute_hash(&txn.date, &row.description, &amount);
    Ok((txn, hash))
}

/// Legacy expenses had no card flag; the description is the only hint.
fn expense_kind(row: &LegacyRow, classifier: &CardExpenseClassifier) -> TransactionKind {
    if classifier.is_card_expense(&row.description) {
        TransactionKind::CardExpense
    } else {
        TransactionKind::Expense {
            is_paid: is_truthy(&row.paid),
        }
    }
}

/// 1-based physical line of the record starting at `byte`. A record's
/// position can point at blank lines the reader skipped before it.
fn line_at(data: &[u8], byte: u64) -> usize {
    let mut start = usize::try_from(byte).unwrap_or(data.len()).min(data.len());
    while matches!(data.get(start), Some(b'\r' | b'\n')) {
        start += 1;
    }
    data[..start].iter().filter(|&&b| b == b'\n').count() + 1
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_id(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

fn is_truthy(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "sim" | "s" | "x"
    )
}

/// Compute a stable, deterministic hash for deduplication.
/// Uses FNV-1a, which unlike DefaultHasher is stable across Rust versions.
fn compute_hash(date: &str, description: &str, amount: &Money) -> String {
    let input = format!("{date}|{description}|{}", amount.amount());
    let hash = fnv1a(input.as_bytes());
    format!("{hash:016x}")
}

fn fnv1a(data: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
#[path = "legacy_csv_tests.rs"]
mod tests;
