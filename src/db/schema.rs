pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS accounts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    name            TEXT NOT NULL,
    kind            TEXT NOT NULL DEFAULT 'debit',
    account_number  TEXT NOT NULL DEFAULT '',
    credit_limit    TEXT,
    cut_off_day     INTEGER,
    payment_due_day INTEGER,
    is_active       BOOLEAN NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL,
    kind      TEXT NOT NULL DEFAULT 'expense',
    icon      TEXT NOT NULL DEFAULT '',
    is_active BOOLEAN NOT NULL DEFAULT 1,
    UNIQUE(name, kind)
);

CREATE TABLE IF NOT EXISTS transactions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id  INTEGER NOT NULL REFERENCES accounts(id),
    category_id INTEGER REFERENCES categories(id),
    kind        TEXT NOT NULL,
    amount      TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    date        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_kind ON transactions(kind);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

CREATE TABLE IF NOT EXISTS fixed_expenses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    account_id  INTEGER NOT NULL REFERENCES accounts(id),
    category_id INTEGER REFERENCES categories(id),
    amount      TEXT NOT NULL,
    description TEXT NOT NULL,
    start_date  TEXT NOT NULL,
    end_date    TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS budgets (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    category_id  INTEGER NOT NULL REFERENCES categories(id),
    month        TEXT NOT NULL,
    amount       TEXT NOT NULL,
    input_type   TEXT NOT NULL DEFAULT 'absolute',
    input_value  TEXT,
    is_manual    BOOLEAN NOT NULL DEFAULT 0,
    UNIQUE(category_id, month)
);

CREATE INDEX IF NOT EXISTS idx_budgets_month ON budgets(month);

CREATE TABLE IF NOT EXISTS settings (
    id                   INTEGER PRIMARY KEY CHECK (id = 1),
    savings_type         TEXT NOT NULL DEFAULT 'percentage',
    savings_percentage   TEXT NOT NULL DEFAULT '20',
    savings_amount       TEXT,
    currency             TEXT NOT NULL DEFAULT 'USD',
    carry_forward_window INTEGER NOT NULL DEFAULT 50
);

"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
