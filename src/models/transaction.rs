use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("income") {
            Self::Income
        } else {
            Self::Expense
        }
    }
}

/// A recorded movement of money. `amount` is always stored positive;
/// the direction lives in `kind`.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: Option<i64>,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    /// Format: "YYYY-MM-DD"
    pub date: String,
    pub created_at: String,
}

impl Transaction {
    pub fn new(
        account_id: i64,
        kind: TransactionKind,
        amount: Decimal,
        date: String,
    ) -> Self {
        Self {
            id: None,
            account_id,
            category_id: None,
            kind,
            amount: amount.abs(),
            description: String::new(),
            date,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Amount with sign applied: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }

    /// The "YYYY-MM" key of the transaction date.
    pub fn month(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }
}
