use rust_decimal::Decimal;

/// A recurring monthly charge (rent, subscriptions, utilities) that is taken
/// off the top before anything is budgeted.
#[derive(Debug, Clone)]
pub struct FixedExpense {
    pub id: Option<i64>,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub description: String,
    /// Format: "YYYY-MM-DD"
    pub start_date: String,
    /// Format: "YYYY-MM-DD". `None` means open-ended.
    pub end_date: Option<String>,
    pub created_at: String,
}

impl FixedExpense {
    pub fn new(account_id: i64, description: String, amount: Decimal, start_date: String) -> Self {
        Self {
            id: None,
            account_id,
            category_id: None,
            amount: amount.abs(),
            description,
            start_date,
            end_date: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Whether the expense is charged at some point within `[month_start, month_end]`.
    /// Dates compare lexically, which is correct for zero-padded ISO dates.
    pub fn is_active_between(&self, month_start: &str, month_end: &str) -> bool {
        self.start_date.as_str() <= month_end
            && self
                .end_date
                .as_deref()
                .map_or(true, |end| end >= month_start)
    }
}
