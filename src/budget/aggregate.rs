//! Scalar helpers that turn raw rows into the numbers a budget is resolved from.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;

use crate::models::{FixedExpense, Transaction};

/// Saturates at the limits of `Decimal`.
pub(crate) fn sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, a| acc.saturating_add(a))
}

/// Total income divided by the number of distinct months that saw any income.
/// Zero when there is no income history.
pub(crate) fn average_monthly_income(income: &[Transaction]) -> Decimal {
    let months: BTreeSet<&str> = income.iter().map(Transaction::month).collect();
    if months.is_empty() {
        return Decimal::ZERO;
    }
    sum(income.iter().map(|t| t.amount)) / Decimal::from(months.len())
}

/// Sum of fixed expenses charged at some point during the month.
pub(crate) fn fixed_total(expenses: &[FixedExpense], month_start: &str, month_end: &str) -> Decimal {
    sum(expenses
        .iter()
        .filter(|fe| fe.is_active_between(month_start, month_end))
        .map(|fe| fe.amount))
}

/// Spending per category. Uncategorized transactions are ignored.
pub(crate) fn spent_by_category(expenses: &[Transaction]) -> HashMap<i64, Decimal> {
    let mut spent: HashMap<i64, Decimal> = HashMap::new();
    for txn in expenses.iter().filter(|t| t.is_expense()) {
        if let Some(category_id) = txn.category_id {
            let total = spent.entry(category_id).or_default();
            *total = total.saturating_add(txn.amount);
        }
    }
    spent
}
