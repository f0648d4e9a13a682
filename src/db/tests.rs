#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn m(d: Decimal) -> Money {
    Money::new(d)
}

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

fn setup() -> (Database, i64, i64) {
    let db = Database::open_in_memory().unwrap();
    let bank = db
        .insert_account(1, &Account::new_bank(0, "Checking", m(dec!(1000.00))))
        .unwrap();
    let card = db
        .insert_account(1, &Account::new_card(0, "Visa", m(dec!(5000)), 10, 20))
        .unwrap();
    (db, bank, card)
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_schema_version_recorded() {
    let db = Database::open_in_memory().unwrap();
    let version: i32 = db
        .conn
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_reopen_file_database_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    {
        let db = Database::open(&path).unwrap();
        db.insert_account(1, &Account::new_bank(0, "Checking", m(dec!(5))))
            .unwrap();
    }
    let db = Database::open(&path).unwrap();
    assert_eq!(db.get_accounts(1).unwrap().len(), 1);
}

// ── Accounts ──────────────────────────────────────────────────

#[test]
fn test_account_roundtrip_and_user_scoping() {
    let (db, bank, card) = setup();
    let fetched = db.get_account(1, card).unwrap().unwrap();
    assert_eq!(fetched.name, "Visa");
    assert!(fetched.is_credit_card());
    assert_eq!(fetched.closing_day, Some(10));
    assert_eq!(fetched.due_day, Some(20));
    assert_eq!(fetched.card_limit, Some(m(dec!(5000))));

    let checking = db.get_account(1, bank).unwrap().unwrap();
    assert!(!checking.is_credit_card());
    assert_eq!(checking.initial_balance, m(dec!(1000.00)));

    assert!(db.get_account(2, bank).unwrap().is_none());
    assert!(db.get_accounts(2).unwrap().is_empty());
    assert_eq!(db.get_accounts(1).unwrap().len(), 2);
}

#[test]
fn test_adjust_balance_accumulates() {
    let (mut db, bank, _) = setup();
    assert_eq!(db.account_balance(1, bank).unwrap(), m(dec!(1000.00)));
    db.adjust_balance(1, bank, m(dec!(-250.25))).unwrap();
    let after = db.adjust_balance(1, bank, m(dec!(10))).unwrap();
    assert_eq!(after, m(dec!(759.75)));
    assert_eq!(db.account_balance(1, bank).unwrap(), m(dec!(759.75)));
}

#[test]
fn test_adjust_other_users_account_fails() {
    let (mut db, bank, _) = setup();
    assert!(db.adjust_balance(2, bank, m(dec!(1))).is_err());
    assert_eq!(db.account_balance(1, bank).unwrap(), m(dec!(1000.00)));
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_transaction_roundtrip_preserves_kind() {
    let (db, bank, card) = setup();
    let kinds = [
        TransactionKind::Income,
        TransactionKind::Expense { is_paid: true },
        TransactionKind::Expense { is_paid: false },
        TransactionKind::CardExpense,
        TransactionKind::Transfer {
            to_account_id: Some(card),
        },
    ];
    for kind in kinds {
        let txn = Transaction::new(0, kind, m(dec!(12.34)), "2024-03-05")
            .with_account(bank)
            .with_category("Misc")
            .with_description("something");
        let id = db.insert_transaction(1, &txn).unwrap();
        let back = db.get_transaction(1, id).unwrap().unwrap();
        assert_eq!(back.kind, kind);
        assert_eq!(back.amount, m(dec!(12.34)));
        assert_eq!(back.category.as_deref(), Some("Misc"));
        assert_eq!(back.installments, None);
    }
    assert_eq!(db.transaction_count(1).unwrap(), 5);
    assert_eq!(db.transaction_count(2).unwrap(), 0);
}

#[test]
fn test_installment_plan_roundtrip() {
    let (db, _, card) = setup();
    let txn = Transaction::new(0, TransactionKind::CardExpense, m(dec!(1000.01)), "2024-01-15")
        .with_account(card)
        .with_installments(3, 1);
    let id = db.insert_transaction(1, &txn).unwrap();
    let back = db.get_transaction(1, id).unwrap().unwrap();
    assert_eq!(back.installments, Some(InstallmentPlan::new(3, 1)));
    assert_eq!(back.amount, m(dec!(1000.01)));
}

#[test]
fn test_transactions_affecting_month() {
    let (db, bank, card) = setup();
    let single_feb = Transaction::new(
        0,
        TransactionKind::Expense { is_paid: true },
        m(dec!(10)),
        "2024-02-10",
    )
    .with_account(bank);
    let single_mar = Transaction::new(0, TransactionKind::Income, m(dec!(20)), "2024-03-01")
        .with_account(bank);
    let plan_jan = Transaction::new(0, TransactionKind::CardExpense, m(dec!(300)), "2024-01-31")
        .with_account(card)
        .with_installments(3, 0);
    let plan_apr = Transaction::new(0, TransactionKind::CardExpense, m(dec!(90)), "2024-04-01")
        .with_account(card)
        .with_installments(3, 0);
    for txn in [&single_feb, &single_mar, &plan_jan, &plan_apr] {
        db.insert_transaction(1, txn).unwrap();
    }

    let candidates = db.get_transactions_affecting(1, ym("2024-03")).unwrap();
    let dates: Vec<&str> = candidates.iter().map(|t| t.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-31", "2024-03-01"]);
    assert_eq!(db.get_transactions(1).unwrap().len(), 4);
}

#[test]
fn test_dates_stored_canonically() {
    let (db, bank, _) = setup();
    let padded = Transaction::new(0, TransactionKind::Income, m(dec!(100)), " 2024-03-05 ")
        .with_account(bank);
    let broken = Transaction::new(0, TransactionKind::Income, m(dec!(5)), "05/03/2024")
        .with_account(bank);
    let padded_id = db.insert_transaction(1, &padded).unwrap();
    let broken_id = db.insert_transaction(1, &broken).unwrap();

    assert_eq!(db.get_transaction(1, padded_id).unwrap().unwrap().date, "2024-03-05");
    assert_eq!(db.get_transaction(1, broken_id).unwrap().unwrap().date, "05/03/2024");

    let candidates = db.get_transactions_affecting(1, ym("2024-03")).unwrap();
    let ids: Vec<i64> = candidates.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![padded_id]);
}

#[test]
fn test_apply_transaction_moves_balances_atomically() {
    let (mut db, bank, card) = setup();
    let savings = db
        .insert_account(1, &Account::new_bank(0, "Savings", Money::ZERO))
        .unwrap();

    let salary = Transaction::new(0, TransactionKind::Income, m(dec!(3000)), "2024-03-01")
        .with_account(bank);
    let rent = Transaction::new(
        0,
        TransactionKind::Expense { is_paid: true },
        m(dec!(1200)),
        "2024-03-02",
    )
    .with_account(bank);
    let bill = Transaction::new(
        0,
        TransactionKind::Expense { is_paid: false },
        m(dec!(80)),
        "2024-03-15",
    )
    .with_account(bank);
    let save = Transaction::new(
        0,
        TransactionKind::Transfer {
            to_account_id: Some(savings),
        },
        m(dec!(500)),
        "2024-03-03",
    )
    .with_account(bank);
    let phone = Transaction::new(0, TransactionKind::CardExpense, m(dec!(900)), "2024-03-04")
        .with_account(card)
        .with_installments(3, 0);

    for txn in [&salary, &rent, &bill, &save, &phone] {
        db.apply_transaction(1, txn).unwrap();
    }
    assert_eq!(db.account_balance(1, bank).unwrap(), m(dec!(2300)));
    assert_eq!(db.account_balance(1, savings).unwrap(), m(dec!(500)));
    assert_eq!(db.account_balance(1, card).unwrap(), Money::ZERO);
}

#[test]
fn test_failed_apply_rolls_back_insert() {
    let (mut db, bank, _) = setup();
    let bad = Transaction::new(
        0,
        TransactionKind::Transfer {
            to_account_id: Some(999),
        },
        m(dec!(50)),
        "2024-03-03",
    )
    .with_account(bank);
    assert!(db.apply_transaction(1, &bad).is_err());
    assert_eq!(db.transaction_count(1).unwrap(), 0);
    assert_eq!(db.account_balance(1, bank).unwrap(), m(dec!(1000.00)));
}

#[test]
fn test_batch_insert_dedupes_by_hash() {
    let (mut db, bank, _) = setup();
    let txn = Transaction::new(0, TransactionKind::Income, m(dec!(10)), "2024-03-01")
        .with_account(bank);
    let batch = vec![
        (txn.clone(), "aaa".to_string()),
        (txn.clone(), "aaa".to_string()),
        (txn.clone(), "bbb".to_string()),
        (txn.clone(), String::new()),
        (txn, String::new()),
    ];
    assert_eq!(db.insert_transactions_batch(1, &batch).unwrap(), 4);
    assert_eq!(db.insert_transactions_batch(1, &batch).unwrap(), 2);
    // hashes are per user
    assert_eq!(db.insert_transactions_batch(2, &batch).unwrap(), 4);
}

// ── Installment payments ──────────────────────────────────────

#[test]
fn test_mark_installment_paid_clamps_at_total() {
    let (mut db, bank, _) = setup();
    let plan = Transaction::new(
        0,
        TransactionKind::Expense { is_paid: false },
        m(dec!(1000.01)),
        "2024-01-15",
    )
    .with_account(bank)
    .with_installments(3, 0);
    let id = db.insert_transaction(1, &plan).unwrap();

    let paid: Vec<Option<Money>> = (0..4)
        .map(|_| db.mark_installment_paid(1, id).unwrap())
        .collect();
    assert_eq!(
        paid,
        vec![
            Some(m(dec!(333.34))),
            Some(m(dec!(333.34))),
            Some(m(dec!(333.33))),
            None,
        ]
    );
    let back = db.get_transaction(1, id).unwrap().unwrap();
    assert_eq!(back.installments, Some(InstallmentPlan::new(3, 3)));
    assert_eq!(db.account_balance(1, bank).unwrap(), m(dec!(-0.01)));
}

#[test]
fn test_mark_installment_paid_rejects_non_plans() {
    let (mut db, bank, _) = setup();
    let single = Transaction::new(0, TransactionKind::Income, m(dec!(5)), "2024-01-15")
        .with_account(bank);
    let id = db.insert_transaction(1, &single).unwrap();
    assert_eq!(db.mark_installment_paid(1, id).unwrap(), None);
    assert!(db.mark_installment_paid(1, 999).is_err());
    assert!(db.mark_installment_paid(2, id).is_err());
}

// ── Investments ───────────────────────────────────────────────

#[test]
fn test_record_purchase_updates_position() {
    let mut db = Database::open_in_memory().unwrap();
    let asset = db.insert_asset(1, AssetType::ListedEquity, " petr4 ").unwrap();
    let day = |s: &str| calendar::parse_date(s).unwrap();

    db.record_purchase(1, &Purchase::new(asset, day("2024-01-10"), m(dec!(10)), dec!(3)))
        .unwrap();
    let after = db
        .record_purchase(1, &Purchase::new(asset, day("2024-02-10"), m(dec!(14)), dec!(1)))
        .unwrap();
    assert_eq!(after.symbol, "PETR4");
    assert_eq!(after.quantity, dec!(4));
    assert_eq!(after.average_price, m(dec!(11)));

    let stored = db.get_asset(1, asset).unwrap().unwrap();
    assert_eq!(stored, after);
    let log = db.get_purchases(1, asset).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].total_invested, m(dec!(14)));
    assert_eq!(crate::investment::rebuild(&log).average_price, m(dec!(11)));
}

#[test]
fn test_rejected_purchase_is_not_logged() {
    let mut db = Database::open_in_memory().unwrap();
    let asset = db.insert_asset(1, AssetType::Crypto, "BTC").unwrap();
    let date = calendar::parse_date("2024-01-10").unwrap();
    assert!(db
        .record_purchase(1, &Purchase::new(asset, date, Money::ZERO, dec!(1)))
        .is_err());
    assert!(db
        .record_purchase(2, &Purchase::new(asset, date, m(dec!(10)), dec!(1)))
        .is_err());
    assert!(db.get_purchases(1, asset).unwrap().is_empty());
    let stored = db.get_asset(1, asset).unwrap().unwrap();
    assert_eq!(stored.quantity, Decimal::ZERO);
    assert_eq!(db.get_assets(1).unwrap().len(), 1);
}
