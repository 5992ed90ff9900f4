use crate::models::BudgetRow;

/// What an editing session for a month starts from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CarryForward {
    /// True iff the target month had no category rows before any save.
    pub(crate) is_new_month: bool,
    /// The month the seed was copied from, if any.
    pub(crate) reference_month: Option<String>,
    /// The target month's own rows, or copies of the reference month's rows
    /// with identity cleared and month rewritten.
    pub(crate) seeded: Vec<BudgetRow>,
}

/// Choose the rows a month's editing session starts from.
///
/// `current_rows` are the target month's stored rows. `recent_rows` are prior
/// rows from storage; they are filtered, sorted newest first and capped at
/// `window` rows here, so storage ordering does not matter. Savings rows never
/// carry forward, and a month holding nothing else is never the reference.
/// Inputs are only read.
pub(crate) fn select_carry_forward(
    target_month: &str,
    current_rows: &[BudgetRow],
    recent_rows: &[BudgetRow],
    savings_category_id: Option<i64>,
    window: usize,
) -> CarryForward {
    let is_savings = |category_id: i64| Some(category_id) == savings_category_id;

    let own: Vec<BudgetRow> = current_rows
        .iter()
        .filter(|row| row.month == target_month && !is_savings(row.category_id))
        .cloned()
        .collect();
    if !own.is_empty() {
        return CarryForward {
            is_new_month: false,
            reference_month: None,
            seeded: own,
        };
    }

    let mut prior: Vec<&BudgetRow> = recent_rows
        .iter()
        .filter(|row| row.month != target_month && !is_savings(row.category_id))
        .collect();
    // Stable sort keeps storage order within a month.
    prior.sort_by(|a, b| b.month.cmp(&a.month));
    prior.truncate(window);

    let Some(reference_month) = prior.first().map(|row| row.month.clone()) else {
        return CarryForward {
            is_new_month: true,
            reference_month: None,
            seeded: Vec::new(),
        };
    };

    let seeded = prior
        .iter()
        .filter(|row| row.month == reference_month)
        .map(|row| BudgetRow {
            id: None,
            month: target_month.to_string(),
            ..(*row).clone()
        })
        .collect();

    CarryForward {
        is_new_month: true,
        reference_month: Some(reference_month),
        seeded,
    }
}
