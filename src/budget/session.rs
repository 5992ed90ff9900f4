use std::collections::HashMap;

use rust_decimal::Decimal;

use super::aggregate::sum;
use super::{
    resolve, Allocation, CarryForward, CategorySpec, MonthContext, Resolution,
    SavingsSpec,
};
use crate::models::{AllocationMode, BudgetRow, Category, CategoryKind, Settings};

/// In-memory state of one month's budget while it is being edited.
///
/// Every edit replaces a spec wholesale; `resolve` is then re-run over the
/// whole snapshot.
#[derive(Debug, Clone)]
pub(crate) struct BudgetSession {
    pub(crate) context: MonthContext,
    pub(crate) savings: SavingsSpec,
    pub(crate) savings_category_id: Option<i64>,
    savings_row_id: Option<i64>,
    pub(crate) specs: Vec<CategorySpec>,
    /// Display names, index-aligned with `specs`.
    pub(crate) names: Vec<String>,
    row_ids: HashMap<i64, i64>,
    pub(crate) is_new_month: bool,
    pub(crate) reference_month: Option<String>,
}

/// Everything needed to open a session, already fetched from storage.
pub(crate) struct SessionInputs<'a> {
    pub(crate) context: MonthContext,
    pub(crate) categories: &'a [Category],
    /// The target month's stored rows, savings row included.
    pub(crate) month_rows: &'a [BudgetRow],
    pub(crate) carry: CarryForward,
    pub(crate) settings: &'a Settings,
    pub(crate) spent: &'a HashMap<i64, Decimal>,
    pub(crate) savings_category_id: Option<i64>,
}

impl BudgetSession {
    pub(crate) fn assemble(inputs: SessionInputs<'_>) -> Self {
        let SessionInputs {
            context,
            categories,
            month_rows,
            carry,
            settings,
            spent,
            savings_category_id,
        } = inputs;

        let savings_row = savings_category_id.and_then(|sid| {
            month_rows
                .iter()
                .find(|row| row.category_id == sid && row.month == context.month)
        });
        let savings = match savings_row {
            Some(row) => SavingsSpec::new(
                row.mode,
                row.manual_value.unwrap_or(settings.savings_percentage),
            ),
            None => {
                let (mode, value) = settings.default_savings();
                SavingsSpec::new(mode, value)
            }
        };

        let by_category: HashMap<i64, &BudgetRow> = carry
            .seeded
            .iter()
            .map(|row| (row.category_id, row))
            .collect();

        let mut specs = Vec::new();
        let mut names = Vec::new();
        let mut row_ids = HashMap::new();
        for category in categories
            .iter()
            .filter(|c| c.is_active && c.kind == CategoryKind::Expense)
        {
            let Some(category_id) = category.id else {
                continue;
            };
            let spec = match by_category.get(&category_id) {
                Some(row) => {
                    if let Some(id) = row.id {
                        row_ids.insert(category_id, id);
                    }
                    match (row.is_manual, row.manual_value) {
                        (true, Some(value)) => CategorySpec::manual(category_id, row.mode, value),
                        _ => CategorySpec {
                            mode: row.mode,
                            ..CategorySpec::automatic(category_id)
                        },
                    }
                }
                None => CategorySpec::automatic(category_id),
            };
            let spent = spent.get(&category_id).copied().unwrap_or_default();
            specs.push(spec.with_spent(spent));
            names.push(category.name.clone());
        }

        Self {
            context,
            savings,
            savings_category_id,
            savings_row_id: savings_row.and_then(|row| row.id),
            specs,
            names,
            row_ids,
            is_new_month: carry.is_new_month,
            reference_month: carry.reference_month,
        }
    }

    pub(crate) fn month(&self) -> &str {
        &self.context.month
    }

    pub(crate) fn resolve(&self) -> Resolution {
        resolve(&self.context, &self.savings, &self.specs)
    }

    pub(crate) fn spec(&self, category_id: i64) -> Option<&CategorySpec> {
        self.specs.iter().find(|s| s.category_id == category_id)
    }

    fn spec_mut(&mut self, category_id: i64) -> Option<&mut CategorySpec> {
        self.specs.iter_mut().find(|s| s.category_id == category_id)
    }

    /// Apply the text of a category input. Returns false for an unknown category.
    pub(crate) fn set_input(&mut self, category_id: i64, input: &str) -> bool {
        self.set_allocation(category_id, Allocation::from_input(input))
    }

    pub(crate) fn set_allocation(&mut self, category_id: i64, allocation: Allocation) -> bool {
        match self.spec_mut(category_id) {
            Some(spec) => {
                spec.allocation = allocation;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_mode(&mut self, category_id: i64, mode: AllocationMode) -> bool {
        match self.spec_mut(category_id) {
            Some(spec) => {
                spec.mode = mode;
                true
            }
            None => false,
        }
    }

    /// Replace a category's spec with an earlier copy of it.
    pub(crate) fn restore(&mut self, spec: CategorySpec) -> bool {
        match self.spec_mut(spec.category_id) {
            Some(current) => {
                *current = spec;
                true
            }
            None => false,
        }
    }

    /// Return a category to automatic.
    pub(crate) fn reset(&mut self, category_id: i64) -> bool {
        self.set_allocation(category_id, Allocation::Automatic)
    }

    pub(crate) fn set_savings_input(&mut self, input: &str) {
        self.savings = SavingsSpec::from_input(self.savings.mode, input);
    }

    pub(crate) fn set_savings_mode(&mut self, mode: AllocationMode) {
        self.savings.mode = mode;
    }

    pub(crate) fn total_spent(&self) -> Decimal {
        sum(self.specs.iter().map(|spec| spec.spent))
    }

    /// The rows to persist for this month: one per category, plus the savings
    /// row when a savings category exists.
    pub(crate) fn to_rows(&self, resolution: &Resolution) -> Vec<BudgetRow> {
        let month = self.context.month.clone();
        let mut rows: Vec<BudgetRow> = self
            .specs
            .iter()
            .map(|spec| {
                let amount = resolution
                    .amount_for(spec.category_id)
                    .unwrap_or_default();
                let row = match spec.allocation {
                    Allocation::Manual(value) => {
                        BudgetRow::manual(spec.category_id, month.clone(), amount, spec.mode, value)
                    }
                    Allocation::Automatic => BudgetRow {
                        mode: spec.mode,
                        ..BudgetRow::automatic(spec.category_id, month.clone(), amount)
                    },
                };
                BudgetRow {
                    id: self.row_ids.get(&spec.category_id).copied(),
                    ..row
                }
            })
            .collect();

        if let Some(savings_category_id) = self.savings_category_id {
            rows.push(BudgetRow {
                id: self.savings_row_id,
                ..BudgetRow::manual(
                    savings_category_id,
                    month,
                    resolution.savings_amount,
                    self.savings.mode,
                    self.savings.value,
                )
            });
        }
        rows
    }
}
