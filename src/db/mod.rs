mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::budget::month::month_bounds;
use crate::budget::{aggregate, select_carry_forward, BudgetSession, MonthContext, SessionInputs};
use crate::models::*;

pub(crate) struct Database {
    conn: Connection,
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap_or_default()
}

fn optional_decimal(s: Option<String>) -> Option<Decimal> {
    s.as_deref().and_then(|v| Decimal::from_str(v).ok())
}

const ACCOUNT_COLUMNS: &str = "id, name, kind, account_number, credit_limit, cut_off_day, payment_due_day, is_active, created_at";

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        kind: AccountKind::parse(&row.get::<_, String>(2)?),
        account_number: row.get(3)?,
        credit_limit: optional_decimal(row.get(4)?),
        cut_off_day: row.get(5)?,
        payment_due_day: row.get(6)?,
        is_active: row.get(7)?,
        created_at: row.get(8)?,
    })
}

const CATEGORY_COLUMNS: &str = "id, name, kind, icon, is_active";

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        kind: CategoryKind::parse(&row.get::<_, String>(2)?),
        icon: row.get(3)?,
        is_active: row.get(4)?,
    })
}

const TRANSACTION_COLUMNS: &str =
    "id, account_id, category_id, kind, amount, description, date, created_at";

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: Some(row.get(0)?),
        account_id: row.get(1)?,
        category_id: row.get(2)?,
        kind: TransactionKind::parse(&row.get::<_, String>(3)?),
        amount: decimal(&row.get::<_, String>(4)?),
        description: row.get(5)?,
        date: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const BUDGET_COLUMNS: &str = "id, category_id, month, amount, input_type, input_value, is_manual";

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<BudgetRow> {
    Ok(BudgetRow {
        id: Some(row.get(0)?),
        category_id: row.get(1)?,
        month: row.get(2)?,
        amount: decimal(&row.get::<_, String>(3)?),
        mode: AllocationMode::parse(&row.get::<_, String>(4)?),
        manual_value: optional_decimal(row.get(5)?),
        is_manual: row.get(6)?,
    })
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_defaults()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_defaults()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            tracing::info!(version = schema::CURRENT_VERSION, "creating database schema");
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
                tracing::info!(from_version, "applying migration");
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

    fn seed_defaults(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("INSERT OR IGNORE INTO settings (id) VALUES (1)", [])?;

        let count: i64 = tx.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count == 0 {
            let defaults: &[(&str, CategoryKind)] = &[
                ("Groceries", CategoryKind::Expense),
                ("Restaurants", CategoryKind::Expense),
                ("Transportation", CategoryKind::Expense),
                ("Health", CategoryKind::Expense),
                ("Entertainment", CategoryKind::Expense),
                ("Shopping", CategoryKind::Expense),
                ("Personal Care", CategoryKind::Expense),
                ("Gifts & Donations", CategoryKind::Expense),
                ("Salary", CategoryKind::Income),
                ("Bonus", CategoryKind::Income),
                ("Savings Fund", CategoryKind::Income),
                ("Subscription", CategoryKind::Fixed),
                ("Utility", CategoryKind::Fixed),
                ("Savings", CategoryKind::Savings),
            ];
            for (name, kind) in defaults {
                tx.execute(
                    "INSERT OR IGNORE INTO categories (name, kind) VALUES (?1, ?2)",
                    params![name, kind.as_str()],
                )?;
            }
            tracing::info!(count = defaults.len(), "seeded default categories");
        }
        tx.commit()?;
        Ok(())
    }

    // ── Accounts ──────────────────────────────────────────────

    pub(crate) fn insert_account(&self, account: &Account) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO accounts (name, kind, account_number, credit_limit, cut_off_day, payment_due_day, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                account.name,
                account.kind.as_str(),
                account.account_number,
                account.credit_limit.map(|d| d.to_string()),
                account.cut_off_day,
                account.payment_due_day,
                account.is_active,
                account.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_accounts(&self) -> Result<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY name"))?;
        let rows = stmt.query_map([], account_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        let result = self.conn.query_row(
            &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"),
            params![id],
            account_from_row,
        );
        match result {
            Ok(a) => Ok(Some(a)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY kind, name"
        ))?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Active categories of one kind, sorted by name.
    pub(crate) fn get_categories_by_kind(&self, kind: CategoryKind) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE kind = ?1 AND is_active = 1 ORDER BY name"
        ))?;
        let rows = stmt.query_map(params![kind.as_str()], category_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn insert_category(&self, cat: &Category) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (name, kind, icon, is_active) VALUES (?1, ?2, ?3, ?4)",
            params![cat.name, cat.kind.as_str(), cat.icon, cat.is_active],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Include or leave out a category from future budgets. Stored rows are
    /// kept. Returns false when no such category exists.
    pub(crate) fn set_category_active(&self, id: i64, active: bool) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE categories SET is_active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        Ok(changed > 0)
    }

    /// The pseudo-category holding savings rows, if one exists.
    pub(crate) fn savings_category_id(&self) -> Result<Option<i64>> {
        let result = self.conn.query_row(
            "SELECT id FROM categories WHERE kind = ?1 ORDER BY id LIMIT 1",
            params![CategoryKind::Savings.as_str()],
            |row| row.get(0),
        );
        match result {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn insert_transaction(&self, txn: &Transaction) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO transactions (account_id, category_id, kind, amount, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                txn.account_id,
                txn.category_id,
                txn.kind.as_str(),
                txn.amount.to_string(),
                txn.description,
                txn.date,
                txn.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Every income transaction ever recorded, oldest first.
    pub(crate) fn get_income_history(&self) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE kind = ?1 ORDER BY date, id"
        ))?;
        let rows = stmt.query_map(
            params![TransactionKind::Income.as_str()],
            transaction_from_row,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_transactions_for_month(&self, month: &str) -> Result<Vec<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE date LIKE ?1 ORDER BY date DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![format!("{month}%")], transaction_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Fixed expenses ────────────────────────────────────────

    pub(crate) fn insert_fixed_expense(&self, fe: &FixedExpense) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO fixed_expenses (account_id, category_id, amount, description, start_date, end_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                fe.account_id,
                fe.category_id,
                fe.amount.to_string(),
                fe.description,
                fe.start_date,
                fe.end_date,
                fe.created_at,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_fixed_expenses(&self) -> Result<Vec<FixedExpense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, account_id, category_id, amount, description, start_date, end_date, created_at
             FROM fixed_expenses ORDER BY start_date, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FixedExpense {
                id: Some(row.get(0)?),
                account_id: row.get(1)?,
                category_id: row.get(2)?,
                amount: decimal(&row.get::<_, String>(3)?),
                description: row.get(4)?,
                start_date: row.get(5)?,
                end_date: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    // ── Budgets ───────────────────────────────────────────────

    pub(crate) fn get_budget_rows(&self, month: &str) -> Result<Vec<BudgetRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE month = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![month], budget_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// The most recent budget rows of any month other than `exclude_month`,
    /// newest month first, at most `limit` rows.
    pub(crate) fn get_recent_budget_rows(
        &self,
        exclude_month: &str,
        limit: u32,
    ) -> Result<Vec<BudgetRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE month != ?1
             ORDER BY month DESC, id LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![exclude_month, limit], budget_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Write a month's rows in one transaction. Rows are keyed by
    /// (category, month), so saving twice updates rather than duplicates.
    pub(crate) fn save_budget_rows(&mut self, rows: &[BudgetRow]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for row in rows {
            tx.execute(
                "INSERT INTO budgets (category_id, month, amount, input_type, input_value, is_manual)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(category_id, month) DO UPDATE SET
                    amount = ?3, input_type = ?4, input_value = ?5, is_manual = ?6",
                params![
                    row.category_id,
                    row.month,
                    row.amount.to_string(),
                    row.mode.as_str(),
                    row.manual_value.map(|v| v.to_string()),
                    row.is_manual,
                ],
            )?;
        }
        tx.commit()?;
        tracing::info!(rows = rows.len(), "saved budget rows");
        Ok(rows.len())
    }

    // ── Settings ──────────────────────────────────────────────

    pub(crate) fn get_settings(&self) -> Result<Settings> {
        let result = self.conn.query_row(
            "SELECT savings_type, savings_percentage, savings_amount, currency, carry_forward_window
             FROM settings WHERE id = 1",
            [],
            |row| {
                Ok(Settings {
                    savings_mode: AllocationMode::parse(&row.get::<_, String>(0)?),
                    savings_percentage: decimal(&row.get::<_, String>(1)?),
                    savings_amount: optional_decimal(row.get(2)?),
                    currency: row.get(3)?,
                    carry_forward_window: row.get(4)?,
                })
            },
        );
        match result {
            Ok(s) => Ok(s),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn update_settings(&self, settings: &Settings) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings (id, savings_type, savings_percentage, savings_amount, currency, carry_forward_window)
             VALUES (1, ?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                savings_type = ?1, savings_percentage = ?2, savings_amount = ?3,
                currency = ?4, carry_forward_window = ?5",
            params![
                settings.savings_mode.as_str(),
                settings.savings_percentage.to_string(),
                settings.savings_amount.map(|d| d.to_string()),
                settings.currency,
                settings.carry_forward_window,
            ],
        )?;
        Ok(())
    }

    // ── Budget sessions ───────────────────────────────────────

    /// Average income and active fixed costs for a month.
    pub(crate) fn month_context(&self, month: &str) -> Result<MonthContext> {
        let (start, end) = month_bounds(month)
            .ok_or_else(|| anyhow::anyhow!("Invalid month: {month}"))?;
        let avg_income = aggregate::average_monthly_income(&self.get_income_history()?);
        let fixed_total = aggregate::fixed_total(&self.get_fixed_expenses()?, &start, &end);
        Ok(MonthContext::new(month, avg_income, fixed_total))
    }

    /// Open an editing session for a month, seeding it from the latest prior
    /// month when it has no rows of its own.
    pub(crate) fn load_session(&self, month: &str) -> Result<BudgetSession> {
        let settings = self.get_settings()?;
        let context = self.month_context(month)?;
        let categories = self.get_categories_by_kind(CategoryKind::Expense)?;
        let savings_category_id = self.savings_category_id()?;
        let month_rows = self.get_budget_rows(month)?;
        let recent_rows = self.get_recent_budget_rows(month, settings.carry_forward_window)?;
        let spent = aggregate::spent_by_category(&self.get_transactions_for_month(month)?);

        let carry = select_carry_forward(
            month,
            &month_rows,
            &recent_rows,
            savings_category_id,
            settings.carry_forward_window as usize,
        );
        if let Some(reference) = &carry.reference_month {
            tracing::info!(
                month,
                reference = %reference,
                rows = carry.seeded.len(),
                "seeding new month from previous budget"
            );
        }

        let session = BudgetSession::assemble(SessionInputs {
            context,
            categories: &categories,
            month_rows: &month_rows,
            carry,
            settings: &settings,
            spent: &spent,
            savings_category_id,
        });
        tracing::debug!(
            month,
            categories = session.specs.len(),
            is_new_month = session.is_new_month,
            "budget session loaded"
        );
        Ok(session)
    }

    /// Resolve and persist the whole month.
    pub(crate) fn save_session(&mut self, session: &BudgetSession) -> Result<usize> {
        let resolution = session.resolve();
        if resolution.is_over_budget {
            tracing::warn!(
                month = session.month(),
                over_by = %resolution.over_by(),
                "saving a budget that exceeds net income"
            );
        }
        self.save_budget_rows(&session.to_rows(&resolution))
    }
}

#[cfg(test)]
mod tests;
