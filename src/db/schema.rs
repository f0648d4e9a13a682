pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL,
    name            TEXT NOT NULL,
    initial_balance TEXT NOT NULL DEFAULT '0',
    balance         TEXT NOT NULL DEFAULT '0',
    card_limit      TEXT,
    closing_day     INTEGER,
    due_day         INTEGER,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_accounts_user ON accounts(user_id);

CREATE TABLE IF NOT EXISTS transactions (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id            INTEGER NOT NULL,
    kind               TEXT NOT NULL,
    amount             TEXT NOT NULL,
    date               TEXT NOT NULL,
    account_id         INTEGER REFERENCES accounts(id),
    to_account_id      INTEGER REFERENCES accounts(id),
    category           TEXT,
    description        TEXT,
    installment_total  INTEGER,
    installments_paid  INTEGER NOT NULL DEFAULT 0,
    is_paid            BOOLEAN NOT NULL DEFAULT 0,
    import_hash        TEXT NOT NULL DEFAULT '',
    created_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);
CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
CREATE UNIQUE INDEX IF NOT EXISTS idx_transactions_hash_unique
    ON transactions(user_id, import_hash) WHERE import_hash != '';

CREATE TABLE IF NOT EXISTS assets (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       INTEGER NOT NULL,
    asset_type    TEXT NOT NULL,
    symbol        TEXT NOT NULL,
    quantity      TEXT NOT NULL DEFAULT '0',
    average_price TEXT NOT NULL DEFAULT '0',
    UNIQUE(user_id, symbol)
);

CREATE TABLE IF NOT EXISTS purchases (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    asset_id       INTEGER NOT NULL REFERENCES assets(id),
    date           TEXT NOT NULL,
    price_per_unit TEXT NOT NULL,
    quantity       TEXT NOT NULL,
    total_invested TEXT NOT NULL,
    created_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_purchases_asset ON purchases(asset_id);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
