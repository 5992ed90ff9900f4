#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

// ── Transaction ───────────────────────────────────────────────

fn make_txn(kind: TransactionKind, amount: Decimal) -> Transaction {
    Transaction::new(1, kind, amount, "2024-01-15".into())
}

#[test]
fn test_income() {
    let txn = make_txn(TransactionKind::Income, dec!(100.00));
    assert!(txn.is_income());
    assert!(!txn.is_expense());
    assert_eq!(txn.signed_amount(), dec!(100.00));
}

#[test]
fn test_expense_is_negative_when_signed() {
    let txn = make_txn(TransactionKind::Expense, dec!(50.00));
    assert!(txn.is_expense());
    assert_eq!(txn.signed_amount(), dec!(-50.00));
}

#[test]
fn test_amount_stored_positive() {
    let txn = make_txn(TransactionKind::Expense, dec!(-42.99));
    assert_eq!(txn.amount, dec!(42.99));
}

#[test]
fn test_transaction_month() {
    assert_eq!(make_txn(TransactionKind::Income, dec!(1)).month(), "2024-01");
}

#[test]
fn test_transaction_kind_parse() {
    assert_eq!(TransactionKind::parse("income"), TransactionKind::Income);
    assert_eq!(TransactionKind::parse("INCOME"), TransactionKind::Income);
    assert_eq!(TransactionKind::parse("expense"), TransactionKind::Expense);
    assert_eq!(TransactionKind::parse("whatever"), TransactionKind::Expense);
}

// ── Account ───────────────────────────────────────────────────

#[test]
fn test_account_kind_parse() {
    assert_eq!(AccountKind::parse("credit"), AccountKind::Credit);
    assert_eq!(AccountKind::parse("Credit Card"), AccountKind::Credit);
    assert_eq!(AccountKind::parse("debit"), AccountKind::Debit);
    assert_eq!(AccountKind::parse("unknown"), AccountKind::Debit);
}

#[test]
fn test_account_kind_roundtrip() {
    for kind in [AccountKind::Debit, AccountKind::Credit] {
        assert_eq!(AccountKind::parse(kind.as_str()), kind);
    }
}

#[test]
fn test_account_new_defaults() {
    let account = Account::new("Wallet".into(), AccountKind::Debit);
    assert!(account.id.is_none());
    assert!(account.is_active);
    assert!(account.credit_limit.is_none());
    assert!(!account.created_at.is_empty());
}

#[test]
fn test_account_find_by_name_skips_inactive() {
    let mut closed = Account::new("Old Card".into(), AccountKind::Credit);
    closed.is_active = false;
    let open = Account::new("Checking".into(), AccountKind::Debit);
    let accounts = vec![closed, open];
    assert!(Account::find_by_name(&accounts, "old card").is_none());
    assert!(Account::find_by_name(&accounts, "CHECKING").is_some());
}

// ── Category ──────────────────────────────────────────────────

#[test]
fn test_category_kind_parse() {
    assert_eq!(CategoryKind::parse("income"), CategoryKind::Income);
    assert_eq!(CategoryKind::parse("fixed_system"), CategoryKind::Fixed);
    assert_eq!(CategoryKind::parse("savings"), CategoryKind::Savings);
    assert_eq!(CategoryKind::parse("expense"), CategoryKind::Expense);
    assert_eq!(CategoryKind::parse(""), CategoryKind::Expense);
}

#[test]
fn test_category_lookup() {
    let mut food = Category::new("Food".into(), CategoryKind::Expense);
    food.id = Some(7);
    let cats = vec![food];
    assert_eq!(Category::find_by_name(&cats, "food").unwrap().id, Some(7));
    assert_eq!(Category::find_by_id(&cats, 7).unwrap().name, "Food");
    assert!(Category::find_by_id(&cats, 8).is_none());
    assert_eq!(format!("{}", cats[0]), "Food");
}

// ── FixedExpense ──────────────────────────────────────────────

#[test]
fn test_fixed_expense_open_ended() {
    let fe = FixedExpense::new(1, "Rent".into(), dec!(1200), "2024-01-01".into());
    assert!(!fe.is_active_between("2023-12-01", "2023-12-31"));
    assert!(fe.is_active_between("2024-01-01", "2024-01-31"));
    assert!(fe.is_active_between("2030-06-01", "2030-06-30"));
}

#[test]
fn test_fixed_expense_with_end_date() {
    let mut fe = FixedExpense::new(1, "Gym".into(), dec!(40), "2024-01-15".into());
    fe.end_date = Some("2024-03-10".into());
    assert!(fe.is_active_between("2024-01-01", "2024-01-31"));
    assert!(fe.is_active_between("2024-03-01", "2024-03-31"));
    assert!(!fe.is_active_between("2024-04-01", "2024-04-30"));
}

// ── Budget rows and settings ──────────────────────────────────

#[test]
fn test_allocation_mode_parse() {
    assert_eq!(AllocationMode::parse("percentage"), AllocationMode::Percentage);
    assert_eq!(AllocationMode::parse("%"), AllocationMode::Percentage);
    assert_eq!(AllocationMode::parse("absolute"), AllocationMode::Absolute);
    assert_eq!(AllocationMode::parse("garbage"), AllocationMode::Absolute);
}

#[test]
fn test_budget_row_constructors() {
    let auto = BudgetRow::automatic(3, "2024-02".into(), dec!(150));
    assert!(!auto.is_manual);
    assert!(auto.manual_value.is_none());

    let pinned = BudgetRow::manual(
        4,
        "2024-02".into(),
        dec!(900),
        AllocationMode::Percentage,
        dec!(10),
    );
    assert!(pinned.is_manual);
    assert_eq!(pinned.manual_value, Some(dec!(10)));
    assert_eq!(pinned.mode, AllocationMode::Percentage);
}

#[test]
fn test_settings_default_savings() {
    let settings = Settings::default();
    assert_eq!(
        settings.default_savings(),
        (AllocationMode::Percentage, dec!(20))
    );
}

#[test]
fn test_settings_absolute_savings_requires_amount() {
    let mut settings = Settings {
        savings_mode: AllocationMode::Absolute,
        ..Settings::default()
    };
    assert_eq!(
        settings.default_savings(),
        (AllocationMode::Percentage, dec!(20))
    );
    settings.savings_amount = Some(dec!(750));
    assert_eq!(
        settings.default_savings(),
        (AllocationMode::Absolute, dec!(750))
    );
}
