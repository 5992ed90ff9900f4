use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::AllocationMode;

/// Facts about a month that come from history rather than from the budget itself.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MonthContext {
    pub(crate) month: String,
    pub(crate) avg_income: Decimal,
    pub(crate) fixed_total: Decimal,
}

impl MonthContext {
    pub(crate) fn new(month: impl Into<String>, avg_income: Decimal, fixed_total: Decimal) -> Self {
        Self {
            month: month.into(),
            avg_income,
            fixed_total,
        }
    }
}

/// Parse a number typed by the user.
///
/// Reads the longest leading number, so `12abc` is 12 and `1e3` is 1000.
/// Anything without a leading number, or too large to represent, counts as zero.
pub(crate) fn parse_amount(input: &str) -> Decimal {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%' | ' '))
        .collect();
    let number = leading_number(&cleaned);
    Decimal::from_str(number)
        .or_else(|_| Decimal::from_scientific(number))
        .unwrap_or_default()
}

fn leading_number(s: &str) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };

    let start = usize::from(bytes.first() == Some(&b'+'));
    let sign_end = if bytes.get(start) == Some(&b'-') { start + 1 } else { start };
    let int_end = digits_from(sign_end);
    let mut end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        // A bare trailing point adds nothing
        if frac_end > end + 1 {
            end = frac_end;
        }
    }
    if end == sign_end {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_start = end + 1;
        let exp_sign_end = exp_start + usize::from(matches!(bytes.get(exp_start), Some(b'+' | b'-')));
        let exp_end = digits_from(exp_sign_end);
        if exp_end > exp_sign_end {
            end = exp_end;
        }
    }
    &s[start..end]
}

/// Applies `value` under `mode` against `base`, saturating at the limits of
/// `Decimal` instead of overflowing.
pub(crate) fn apply_mode(mode: AllocationMode, value: Decimal, base: Decimal) -> Decimal {
    match mode {
        AllocationMode::Percentage => base.saturating_mul(value / Decimal::ONE_HUNDRED),
        AllocationMode::Absolute => value,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SavingsSpec {
    pub(crate) mode: AllocationMode,
    pub(crate) value: Decimal,
}

impl SavingsSpec {
    pub(crate) fn new(mode: AllocationMode, value: Decimal) -> Self {
        Self { mode, value }
    }

    pub(crate) fn from_input(mode: AllocationMode, input: &str) -> Self {
        Self::new(mode, parse_amount(input))
    }

    /// Percentages are taken of average income, not of net income.
    pub(crate) fn amount(&self, avg_income: Decimal) -> Decimal {
        apply_mode(self.mode, self.value, avg_income)
    }
}

/// Whether a category's amount was pinned by the user or is derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Allocation {
    Manual(Decimal),
    Automatic,
}

impl Allocation {
    /// Interpret the text of a category input. Clearing the input demotes the
    /// category to automatic; any other text pins it, unparseable text at zero.
    pub(crate) fn from_input(input: &str) -> Self {
        if input.trim().is_empty() {
            Self::Automatic
        } else {
            Self::Manual(parse_amount(input))
        }
    }

    pub(crate) fn is_manual(&self) -> bool {
        matches!(self, Self::Manual(_))
    }

    pub(crate) fn manual_value(&self) -> Option<Decimal> {
        match self {
            Self::Manual(value) => Some(*value),
            Self::Automatic => None,
        }
    }
}

/// One expense category as it enters resolution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategorySpec {
    pub(crate) category_id: i64,
    /// Applies to a manual value; kept while automatic so the choice survives re-pinning.
    pub(crate) mode: AllocationMode,
    pub(crate) allocation: Allocation,
    /// Informational only; never used by resolution.
    pub(crate) spent: Decimal,
}

impl CategorySpec {
    pub(crate) fn automatic(category_id: i64) -> Self {
        Self {
            category_id,
            mode: AllocationMode::Absolute,
            allocation: Allocation::Automatic,
            spent: Decimal::ZERO,
        }
    }

    pub(crate) fn manual(category_id: i64, mode: AllocationMode, value: Decimal) -> Self {
        Self {
            category_id,
            mode,
            allocation: Allocation::Manual(value),
            spent: Decimal::ZERO,
        }
    }

    pub(crate) fn with_spent(mut self, spent: Decimal) -> Self {
        self.spent = spent;
        self
    }
}
