#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

fn run(db: &mut Database, argv: &[&str]) -> Result<()> {
    let mut args = vec!["autobudget".to_string()];
    args.extend(argv.iter().map(|a| a.to_string()));
    as_cli(&args, db)
}

fn row_for(db: &Database, month: &str, name: &str) -> BudgetRow {
    let cats = db.get_categories().unwrap();
    let id = Category::find_by_name(&cats, name).unwrap().id.unwrap();
    db.get_budget_rows(month)
        .unwrap()
        .into_iter()
        .find(|r| r.category_id == id)
        .unwrap()
}

// ── Argument helpers ─────────────────────────────────────────

#[test]
fn test_split_mode() {
    assert_eq!(split_mode("15%"), (AllocationMode::Percentage, "15"));
    assert_eq!(split_mode(" 250 "), (AllocationMode::Absolute, "250"));
}

#[test]
fn test_take_flag_removes_name_and_value() {
    let mut args: Vec<String> = ["Groceries", "--month", "2024-02", "300"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(take_flag(&mut args, "--month").unwrap().as_deref(), Some("2024-02"));
    assert_eq!(args, vec!["Groceries".to_string(), "300".to_string()]);
    assert!(take_flag(&mut args, "--month").unwrap().is_none());

    let mut dangling = vec!["--month".to_string()];
    assert!(take_flag(&mut dangling, "--month").is_err());
}

#[test]
fn test_take_switch() {
    let mut args = vec!["Tips".to_string(), "--income".to_string()];
    assert!(take_switch(&mut args, "--income"));
    assert_eq!(args, vec!["Tips".to_string()]);
    assert!(!take_switch(&mut args, "--income"));
}

#[test]
fn test_parse_money_and_date() {
    assert_eq!(parse_money("$1,250.50").unwrap(), dec!(1250.50));
    assert!(parse_money("lots").is_err());
    assert_eq!(parse_date("2024-03-09").unwrap(), "2024-03-09");
    assert!(parse_date("2024-02-30").is_err());
}

// ── Budget edits ─────────────────────────────────────────────

#[test]
fn test_set_saves_whole_month() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["set", "groceries", "400", "--month", "2024-02"]).unwrap();

    let rows = db.get_budget_rows("2024-02").unwrap();
    // Eight expense categories plus the savings row
    assert_eq!(rows.len(), 9);
    let groceries = row_for(&db, "2024-02", "Groceries");
    assert!(groceries.is_manual);
    assert_eq!(groceries.manual_value, Some(dec!(400)));
    assert_eq!(groceries.amount, dec!(400));
    assert_eq!(groceries.mode, AllocationMode::Absolute);
}

#[test]
fn test_set_percentage_then_auto() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["set", "Health", "10%", "--month", "2024-02"]).unwrap();
    let health = row_for(&db, "2024-02", "Health");
    assert_eq!(health.mode, AllocationMode::Percentage);
    assert_eq!(health.manual_value, Some(dec!(10)));

    run(&mut db, &["auto", "Health", "--month", "2024-02"]).unwrap();
    let health = row_for(&db, "2024-02", "Health");
    assert!(!health.is_manual);
    assert!(health.manual_value.is_none());
}

#[test]
fn test_set_unknown_category_fails_without_saving() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["set", "Yachts", "400", "--month", "2024-02"]).is_err());
    assert!(db.get_budget_rows("2024-02").unwrap().is_empty());
}

#[test]
fn test_set_requires_value() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["set", "Groceries"]).is_err());
}

#[test]
fn test_income_category_cannot_be_pinned() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["set", "Salary", "400", "--month", "2024-02"]).is_err());
}

#[test]
fn test_savings_absolute() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["savings", "750", "--month", "2024-06"]).unwrap();
    let savings = row_for(&db, "2024-06", "Savings");
    assert!(savings.is_manual);
    assert_eq!(savings.mode, AllocationMode::Absolute);
    assert_eq!(savings.manual_value, Some(dec!(750)));
    assert_eq!(savings.amount, dec!(750));
}

#[test]
fn test_first_edit_materialises_carried_rows() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["set", "Groceries", "400", "--month", "2024-01"]).unwrap();
    run(&mut db, &["set", "Health", "90", "--month", "2024-02"]).unwrap();

    let groceries = row_for(&db, "2024-02", "Groceries");
    assert_eq!(groceries.manual_value, Some(dec!(400)));
    let health_jan = row_for(&db, "2024-01", "Health");
    assert!(!health_jan.is_manual);
}

#[test]
fn test_invalid_month_rejected() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["budget", "2024-13"]).is_err());
    assert!(run(&mut db, &["budget", "2024-03"]).is_ok());
}

// ── Records ──────────────────────────────────────────────────

#[test]
fn test_record_transactions_and_summarize() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["account", "Checking"]).unwrap();
    run(&mut db, &["income", "2024-03-01", "4000", "Salary"]).unwrap();
    run(&mut db, &["expense", "2024-03-04", "$62.10", "Groceries", "--note", "market"]).unwrap();
    run(&mut db, &["set", "Groceries", "300", "--month", "2024-03"]).unwrap();
    run(&mut db, &["summary", "2024-03"]).unwrap();

    let txns = db.get_transactions_for_month("2024-03").unwrap();
    assert_eq!(txns.len(), 2);
    let expense = txns.iter().find(|t| t.is_expense()).unwrap();
    assert_eq!(expense.amount, dec!(62.10));
    assert_eq!(expense.description, "market");
    assert!(expense.category_id.is_some());
}

#[test]
fn test_transaction_needs_known_account() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["account", "Checking"]).unwrap();
    let result = run(&mut db, &["expense", "2024-03-04", "5", "--account", "Nope"]);
    assert!(result.is_err());
}

#[test]
fn test_fixed_expense_range() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["account", "Checking"]).unwrap();
    run(&mut db, &["fixed", "Rent", "1200", "2024-01-01", "--until", "2024-06-30"]).unwrap();
    assert!(run(&mut db, &["fixed", "Gym", "40", "2024-05-01", "--until", "2024-04-01"]).is_err());

    let fixed = db.get_fixed_expenses().unwrap();
    assert_eq!(fixed.len(), 1);
    assert_eq!(fixed[0].end_date.as_deref(), Some("2024-06-30"));
    assert_eq!(db.month_context("2024-07").unwrap().fixed_total, dec!(0));
    assert_eq!(db.month_context("2024-06").unwrap().fixed_total, dec!(1200));
}

#[test]
fn test_add_category_rejects_duplicates() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["category", "Pets"]).unwrap();
    assert!(run(&mut db, &["category", "pets"]).is_err());
    run(&mut db, &["category", "Tips", "--income"]).unwrap();

    let cats = db.get_categories().unwrap();
    assert_eq!(Category::find_by_name(&cats, "Tips").unwrap().kind, CategoryKind::Income);
}

#[test]
fn test_disabled_category_leaves_the_auto_split() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["account", "Checking"]).unwrap();
    run(&mut db, &["income", "2024-03-01", "10000", "Salary"]).unwrap();
    let before = db.load_session("2024-03").unwrap();
    assert_eq!(before.specs.len(), 8);
    assert_eq!(before.resolve().auto_amount, dec!(1000));

    run(&mut db, &["category", "Health", "--disable"]).unwrap();
    let after = db.load_session("2024-03").unwrap();
    assert_eq!(after.specs.len(), 7);
    assert!(!after.names.iter().any(|n| n == "Health"));
    assert_eq!(after.resolve().auto_amount, dec!(8000) / dec!(7));

    run(&mut db, &["category", "health", "--enable"]).unwrap();
    assert_eq!(db.load_session("2024-03").unwrap().specs.len(), 8);
}

#[test]
fn test_category_toggle_rejects_bad_targets() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["category", "Savings", "--disable"]).is_err());
    assert!(run(&mut db, &["category", "Yachts", "--disable"]).is_err());
    assert!(run(&mut db, &["category", "Health", "--enable", "--disable"]).is_err());
    assert!(db.savings_category_id().unwrap().is_some());
}

#[test]
fn test_settings_update() {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["settings", "--savings", "500", "--window", "12"]).unwrap();
    let settings = db.get_settings().unwrap();
    assert_eq!(settings.savings_mode, AllocationMode::Absolute);
    assert_eq!(settings.savings_amount, Some(dec!(500)));
    assert_eq!(settings.carry_forward_window, 12);

    assert!(run(&mut db, &["settings", "--window", "0"]).is_err());
    assert!(run(&mut db, &["settings", "--window", "many"]).is_err());
}

#[test]
fn test_unknown_command() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["frobnicate"]).is_err());
    assert!(run(&mut db, &["version"]).is_ok());
}
