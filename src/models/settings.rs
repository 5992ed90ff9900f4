use rust_decimal::Decimal;

use super::AllocationMode;

/// Per-user preferences, stored as the single row of the `settings` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Mode used for savings when a month has no savings row yet.
    pub savings_mode: AllocationMode,
    pub savings_percentage: Decimal,
    pub savings_amount: Option<Decimal>,
    pub currency: String,
    /// Upper bound on prior budget rows scanned when seeding a new month.
    pub carry_forward_window: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            savings_mode: AllocationMode::Percentage,
            savings_percentage: Decimal::from(20),
            savings_amount: None,
            currency: "USD".to_string(),
            carry_forward_window: 50,
        }
    }
}

impl Settings {
    /// The savings input a month starts from when nothing was saved for it.
    pub fn default_savings(&self) -> (AllocationMode, Decimal) {
        match (self.savings_mode, self.savings_amount) {
            (AllocationMode::Absolute, Some(amount)) => (AllocationMode::Absolute, amount),
            _ => (AllocationMode::Percentage, self.savings_percentage),
        }
    }
}
