use rust_decimal::Decimal;

use super::aggregate::sum;
use super::spec::{apply_mode, Allocation, CategorySpec, MonthContext, SavingsSpec};

/// Allocation beyond net income smaller than this is float-style noise, not overspending.
pub(crate) const OVER_BUDGET_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedAllocation {
    pub(crate) category_id: i64,
    pub(crate) amount: Decimal,
    pub(crate) is_manual: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
    pub(crate) savings_amount: Decimal,
    pub(crate) net_income: Decimal,
    /// Same order as the specs passed in.
    pub(crate) allocations: Vec<ResolvedAllocation>,
    pub(crate) manual_total: Decimal,
    pub(crate) remaining: Decimal,
    pub(crate) automatic_count: usize,
    pub(crate) auto_amount: Decimal,
    pub(crate) total_allocated: Decimal,
    pub(crate) is_over_budget: bool,
}

impl Resolution {
    pub(crate) fn amount_for(&self, category_id: i64) -> Option<Decimal> {
        self.allocations
            .iter()
            .find(|a| a.category_id == category_id)
            .map(|a| a.amount)
    }

    /// How far allocations exceed net income, zero when within budget.
    pub(crate) fn over_by(&self) -> Decimal {
        self.total_allocated
            .saturating_sub(self.net_income)
            .max(Decimal::ZERO)
    }
}

/// Resolve every category's amount for a month.
///
/// Savings come off average income first, then fixed costs, leaving net income.
/// Manual categories get exactly what they ask for (percentages are of net
/// income); automatic categories split whatever is left equally, never below
/// zero. A deficit is never taken out of manual pins. Sums saturate at the
/// limits of `Decimal`, so absurd inputs yield an over-budget month rather
/// than an overflow.
pub(crate) fn resolve(
    context: &MonthContext,
    savings: &SavingsSpec,
    specs: &[CategorySpec],
) -> Resolution {
    let savings_amount = savings.amount(context.avg_income);
    let net_income = context
        .avg_income
        .saturating_sub(context.fixed_total)
        .saturating_sub(savings_amount);

    let mut manual_total = Decimal::ZERO;
    let mut automatic_count = 0usize;
    let manual_amounts: Vec<Option<Decimal>> = specs
        .iter()
        .map(|spec| match spec.allocation {
            Allocation::Manual(value) => {
                let amount = apply_mode(spec.mode, value, net_income);
                manual_total = manual_total.saturating_add(amount);
                Some(amount)
            }
            Allocation::Automatic => {
                automatic_count += 1;
                None
            }
        })
        .collect();

    let remaining = net_income.saturating_sub(manual_total);
    let auto_amount = if automatic_count > 0 {
        (remaining / Decimal::from(automatic_count)).max(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    let allocations: Vec<ResolvedAllocation> = specs
        .iter()
        .zip(manual_amounts)
        .map(|(spec, manual)| ResolvedAllocation {
            category_id: spec.category_id,
            amount: manual.unwrap_or(auto_amount),
            is_manual: manual.is_some(),
        })
        .collect();

    let total_allocated = sum(allocations.iter().map(|a| a.amount));

    Resolution {
        savings_amount,
        net_income,
        allocations,
        manual_total,
        remaining,
        automatic_count,
        auto_amount,
        total_allocated,
        is_over_budget: total_allocated > net_income.saturating_add(OVER_BUDGET_TOLERANCE),
    }
}
