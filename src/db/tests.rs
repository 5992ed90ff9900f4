#![allow(clippy::unwrap_used)]

use super::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::budget::Allocation;

// ── Default data ──────────────────────────────────────────────

#[test]
fn test_default_categories_seeded() {
    let db = Database::open_in_memory().unwrap();
    let cats = db.get_categories().unwrap();
    assert!(cats.iter().any(|c| c.name == "Groceries" && c.kind == CategoryKind::Expense));
    assert!(cats.iter().any(|c| c.name == "Salary" && c.kind == CategoryKind::Income));
    assert_eq!(
        cats.iter().filter(|c| c.kind == CategoryKind::Savings).count(),
        1
    );
    assert!(db.savings_category_id().unwrap().is_some());
}

#[test]
fn test_reopen_does_not_reseed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("budget.db");
    let first = Database::open(&path).unwrap();
    let count = first.get_categories().unwrap().len();
    drop(first);

    let second = Database::open(&path).unwrap();
    assert_eq!(second.get_categories().unwrap().len(), count);
}

#[test]
fn test_categories_by_kind_excludes_other_kinds() {
    let db = Database::open_in_memory().unwrap();
    let expense = db.get_categories_by_kind(CategoryKind::Expense).unwrap();
    assert!(!expense.is_empty());
    assert!(expense.iter().all(|c| c.kind == CategoryKind::Expense));

    let mut hidden = Category::new("Retired".into(), CategoryKind::Expense);
    hidden.is_active = false;
    db.insert_category(&hidden).unwrap();
    let expense = db.get_categories_by_kind(CategoryKind::Expense).unwrap();
    assert!(!expense.iter().any(|c| c.name == "Retired"));
}

#[test]
fn test_set_category_active_toggles_membership() {
    let db = Database::open_in_memory().unwrap();
    let id = db
        .insert_category(&Category::new("Pets".into(), CategoryKind::Expense))
        .unwrap();

    assert!(db.set_category_active(id, false).unwrap());
    let expense = db.get_categories_by_kind(CategoryKind::Expense).unwrap();
    assert!(!expense.iter().any(|c| c.id == Some(id)));
    let all = db.get_categories().unwrap();
    assert!(!Category::find_by_id(&all, id).unwrap().is_active);

    assert!(db.set_category_active(id, true).unwrap());
    let expense = db.get_categories_by_kind(CategoryKind::Expense).unwrap();
    assert!(expense.iter().any(|c| c.id == Some(id)));

    assert!(!db.set_category_active(99999, false).unwrap());
}

// ── Accounts ──────────────────────────────────────────────────

#[test]
fn test_account_crud() {
    let db = Database::open_in_memory().unwrap();
    let mut card = Account::new("Visa".into(), AccountKind::Credit);
    card.credit_limit = Some(dec!(5000));
    card.cut_off_day = Some(20);
    let id = db.insert_account(&card).unwrap();

    let fetched = db.get_account_by_id(id).unwrap().unwrap();
    assert_eq!(fetched.name, "Visa");
    assert_eq!(fetched.kind, AccountKind::Credit);
    assert_eq!(fetched.credit_limit, Some(dec!(5000)));
    assert_eq!(fetched.cut_off_day, Some(20));
    assert!(fetched.payment_due_day.is_none());

    assert!(db.get_account_by_id(99999).unwrap().is_none());
}

// ── Transactions and fixed expenses ───────────────────────────

fn add_account(db: &Database) -> i64 {
    db.insert_account(&Account::new("Checking".into(), AccountKind::Debit))
        .unwrap()
}

fn category_id(db: &Database, name: &str) -> i64 {
    let cats = db.get_categories().unwrap();
    Category::find_by_name(&cats, name).unwrap().id.unwrap()
}

fn add_txn(db: &Database, account: i64, kind: TransactionKind, amount: Decimal, date: &str, cat: Option<i64>) {
    let mut txn = Transaction::new(account, kind, amount, date.into());
    txn.category_id = cat;
    db.insert_transaction(&txn).unwrap();
}

#[test]
fn test_income_history_only_income() {
    let db = Database::open_in_memory().unwrap();
    let acct = add_account(&db);
    add_txn(&db, acct, TransactionKind::Income, dec!(3000), "2024-01-15", None);
    add_txn(&db, acct, TransactionKind::Expense, dec!(40), "2024-01-16", None);
    add_txn(&db, acct, TransactionKind::Income, dec!(1000), "2023-12-15", None);

    let history = db.get_income_history().unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|t| t.is_income()));
    assert_eq!(history[0].date, "2023-12-15");
}

#[test]
fn test_transactions_for_month() {
    let db = Database::open_in_memory().unwrap();
    let acct = add_account(&db);
    add_txn(&db, acct, TransactionKind::Expense, dec!(12.34), "2024-02-03", None);
    add_txn(&db, acct, TransactionKind::Expense, dec!(5), "2024-03-01", None);

    let feb = db.get_transactions_for_month("2024-02").unwrap();
    assert_eq!(feb.len(), 1);
    assert_eq!(feb[0].amount, dec!(12.34));
}

#[test]
fn test_month_context() {
    let db = Database::open_in_memory().unwrap();
    let acct = add_account(&db);
    add_txn(&db, acct, TransactionKind::Income, dec!(4000), "2024-01-15", None);
    add_txn(&db, acct, TransactionKind::Income, dec!(2000), "2024-02-15", None);
    db.insert_fixed_expense(&FixedExpense::new(acct, "Rent".into(), dec!(1500), "2024-01-01".into()))
        .unwrap();
    let mut gym = FixedExpense::new(acct, "Gym".into(), dec!(50), "2023-06-01".into());
    gym.end_date = Some("2024-02-15".into());
    db.insert_fixed_expense(&gym).unwrap();

    let march = db.month_context("2024-03").unwrap();
    assert_eq!(march.avg_income, dec!(3000));
    assert_eq!(march.fixed_total, dec!(1500));

    let feb = db.month_context("2024-02").unwrap();
    assert_eq!(feb.fixed_total, dec!(1550));

    assert!(db.month_context("2024-13").is_err());
}

// ── Budgets ───────────────────────────────────────────────────

#[test]
fn test_save_budget_rows_upserts() {
    let mut db = Database::open_in_memory().unwrap();
    let groceries = category_id(&db, "Groceries");

    db.save_budget_rows(&[BudgetRow::automatic(groceries, "2024-01".into(), dec!(300))])
        .unwrap();
    db.save_budget_rows(&[BudgetRow::manual(
        groceries,
        "2024-01".into(),
        dec!(450),
        AllocationMode::Absolute,
        dec!(450),
    )])
    .unwrap();

    let rows = db.get_budget_rows("2024-01").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, dec!(450));
    assert!(rows[0].is_manual);
    assert_eq!(rows[0].manual_value, Some(dec!(450)));
    assert_eq!(rows[0].mode, AllocationMode::Absolute);
}

#[test]
fn test_recent_budget_rows_excludes_month_and_limits() {
    let mut db = Database::open_in_memory().unwrap();
    let groceries = category_id(&db, "Groceries");
    let fun = category_id(&db, "Entertainment");
    let rows: Vec<BudgetRow> = ["2024-01", "2024-02", "2024-03"]
        .iter()
        .flat_map(|m| {
            [
                BudgetRow::automatic(groceries, m.to_string(), dec!(100)),
                BudgetRow::automatic(fun, m.to_string(), dec!(50)),
            ]
        })
        .collect();
    db.save_budget_rows(&rows).unwrap();

    let recent = db.get_recent_budget_rows("2024-03", 50).unwrap();
    assert_eq!(recent.len(), 4);
    assert_eq!(recent[0].month, "2024-02");
    assert!(recent.iter().all(|r| r.month != "2024-03"));

    let limited = db.get_recent_budget_rows("2024-03", 1).unwrap();
    assert_eq!(limited.len(), 1);
}

// ── Settings ──────────────────────────────────────────────────

#[test]
fn test_settings_default_and_update() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(db.get_settings().unwrap(), Settings::default());

    let updated = Settings {
        savings_mode: AllocationMode::Absolute,
        savings_amount: Some(dec!(800)),
        carry_forward_window: 12,
        ..Settings::default()
    };
    db.update_settings(&updated).unwrap();
    assert_eq!(db.get_settings().unwrap(), updated);
}

// ── Sessions ──────────────────────────────────────────────────

#[test]
fn test_new_month_seeds_from_previous_and_leaves_source_untouched() {
    let mut db = Database::open_in_memory().unwrap();
    let acct = add_account(&db);
    add_txn(&db, acct, TransactionKind::Income, dec!(10000), "2024-01-15", None);
    let groceries = category_id(&db, "Groceries");

    let mut january = db.load_session("2024-01").unwrap();
    assert!(january.is_new_month);
    assert!(january.reference_month.is_none());
    january.set_input(groceries, "500");
    db.save_session(&january).unwrap();
    let source_before = db.get_budget_rows("2024-01").unwrap();

    let february = db.load_session("2024-02").unwrap();
    assert!(february.is_new_month);
    assert_eq!(february.reference_month.as_deref(), Some("2024-01"));
    assert_eq!(
        february.spec(groceries).unwrap().allocation,
        Allocation::Manual(dec!(500))
    );
    assert!(db.get_budget_rows("2024-02").unwrap().is_empty());

    db.save_session(&february).unwrap();
    assert_eq!(db.get_budget_rows("2024-01").unwrap(), source_before);

    let reopened = db.load_session("2024-02").unwrap();
    assert!(!reopened.is_new_month);
}

#[test]
fn test_savings_row_saved_but_not_carried() {
    let mut db = Database::open_in_memory().unwrap();
    let savings_id = db.savings_category_id().unwrap().unwrap();

    let mut session = db.load_session("2024-05").unwrap();
    session.set_savings_mode(AllocationMode::Absolute);
    session.set_savings_input("1234");
    db.save_session(&session).unwrap();

    let rows = db.get_budget_rows("2024-05").unwrap();
    let savings = rows.iter().find(|r| r.category_id == savings_id).unwrap();
    assert_eq!(savings.manual_value, Some(dec!(1234)));

    let reopened = db.load_session("2024-05").unwrap();
    assert_eq!(reopened.savings.mode, AllocationMode::Absolute);
    assert_eq!(reopened.savings.value, dec!(1234));

    // Next month falls back to the settings default
    let next = db.load_session("2024-06").unwrap();
    assert_eq!(next.savings.mode, AllocationMode::Percentage);
    assert_eq!(next.savings.value, dec!(20));
}

#[test]
fn test_saved_amounts_match_resolution() {
    let mut db = Database::open_in_memory().unwrap();
    let acct = add_account(&db);
    add_txn(&db, acct, TransactionKind::Income, dec!(8000), "2024-04-01", None);
    let session = db.load_session("2024-04").unwrap();
    let resolution = session.resolve();
    db.save_session(&session).unwrap();

    for row in db.get_budget_rows("2024-04").unwrap() {
        if Some(row.category_id) == session.savings_category_id {
            assert_eq!(row.amount, resolution.savings_amount);
        } else {
            assert_eq!(Some(row.amount), resolution.amount_for(row.category_id));
        }
    }
}
