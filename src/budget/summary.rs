use std::collections::HashMap;

use rust_decimal::Decimal;

use super::aggregate::{spent_by_category, sum};
use crate::models::{BudgetRow, Category, Transaction};

/// One budgeted category's spending against its allocation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryUsage {
    pub(crate) category_id: i64,
    pub(crate) name: String,
    pub(crate) budgeted: Decimal,
    pub(crate) spent: Decimal,
    /// `spent / budgeted`; above one means overspent.
    pub(crate) usage: Decimal,
}

impl CategoryUsage {
    pub(crate) fn remaining(&self) -> Decimal {
        self.budgeted.saturating_sub(self.spent).max(Decimal::ZERO)
    }

    pub(crate) fn excess(&self) -> Decimal {
        self.spent.saturating_sub(self.budgeted).max(Decimal::ZERO)
    }

    pub(crate) fn is_over(&self) -> bool {
        self.spent > self.budgeted
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthSummary {
    pub(crate) month: String,
    pub(crate) income: Decimal,
    pub(crate) expenses: Decimal,
    pub(crate) net: Decimal,
    /// Most used first.
    pub(crate) categories: Vec<CategoryUsage>,
}

impl MonthSummary {
    pub(crate) fn total_budgeted(&self) -> Decimal {
        sum(self.categories.iter().map(|c| c.budgeted))
    }
}

/// Compare a month's stored budget with what was actually spent.
///
/// Only categories with a positive budget are listed; the savings row is left
/// out since nothing is spent against it.
pub(crate) fn summarize(
    month: &str,
    rows: &[BudgetRow],
    categories: &[Category],
    transactions: &[Transaction],
    savings_category_id: Option<i64>,
) -> MonthSummary {
    let in_month: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.month() == month)
        .cloned()
        .collect();
    let spent: HashMap<i64, Decimal> = spent_by_category(&in_month);

    let mut usage: Vec<CategoryUsage> = rows
        .iter()
        .filter(|row| row.month == month && row.amount > Decimal::ZERO)
        .filter(|row| Some(row.category_id) != savings_category_id)
        .map(|row| {
            let spent = spent.get(&row.category_id).copied().unwrap_or_default();
            CategoryUsage {
                category_id: row.category_id,
                name: Category::find_by_id(categories, row.category_id)
                    .map_or_else(|| format!("#{}", row.category_id), |c| c.name.clone()),
                budgeted: row.amount,
                spent,
                usage: spent.checked_div(row.amount).unwrap_or(Decimal::MAX),
            }
        })
        .collect();
    usage.sort_by(|a, b| {
        b.usage
            .cmp(&a.usage)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.category_id.cmp(&b.category_id))
    });

    MonthSummary {
        month: month.to_string(),
        income: sum(in_month.iter().filter(|t| t.is_income()).map(|t| t.amount)),
        expenses: sum(in_month.iter().filter(|t| t.is_expense()).map(|t| t.amount)),
        net: sum(in_month.iter().map(Transaction::signed_amount)),
        categories: usage,
    }
}
