use rust_decimal::Decimal;

/// How a budget input is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMode {
    Percentage,
    Absolute,
}

impl AllocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Absolute => "absolute",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "percentage" | "percent" | "%" => Self::Percentage,
            _ => Self::Absolute,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Percentage => "%",
            Self::Absolute => "$",
        }
    }
}

/// One persisted budget line: a category's resolved allocation for a month.
/// The savings pseudo-category is stored the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRow {
    pub id: Option<i64>,
    pub category_id: i64,
    /// Format: "YYYY-MM"
    pub month: String,
    pub amount: Decimal,
    pub mode: AllocationMode,
    /// The pinned input; `None` for automatic rows.
    pub manual_value: Option<Decimal>,
    pub is_manual: bool,
}

impl BudgetRow {
    pub fn automatic(category_id: i64, month: String, amount: Decimal) -> Self {
        Self {
            id: None,
            category_id,
            month,
            amount,
            mode: AllocationMode::Absolute,
            manual_value: None,
            is_manual: false,
        }
    }

    pub fn manual(
        category_id: i64,
        month: String,
        amount: Decimal,
        mode: AllocationMode,
        value: Decimal,
    ) -> Self {
        Self {
            id: None,
            category_id,
            month,
            amount,
            mode,
            manual_value: Some(value),
            is_manual: true,
        }
    }
}
