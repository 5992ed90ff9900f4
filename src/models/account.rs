use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Debit,
    Credit,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "credit" | "credit card" | "creditcard" | "card" => Self::Credit,
            _ => Self::Debit,
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debit => write!(f, "Debit"),
            Self::Credit => write!(f, "Credit"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Option<i64>,
    pub name: String,
    pub kind: AccountKind,
    pub account_number: String,
    /// Only meaningful for credit accounts.
    pub credit_limit: Option<Decimal>,
    pub cut_off_day: Option<u32>,
    pub payment_due_day: Option<u32>,
    pub is_active: bool,
    pub created_at: String,
}

impl Account {
    pub fn new(name: String, kind: AccountKind) -> Self {
        Self {
            id: None,
            name,
            kind,
            account_number: String::new(),
            credit_limit: None,
            cut_off_day: None,
            payment_due_day: None,
            is_active: true,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Find an active account by name (case-insensitive).
    pub fn find_by_name<'a>(accounts: &'a [Account], name: &str) -> Option<&'a Account> {
        let lower = name.to_lowercase();
        accounts
            .iter()
            .find(|a| a.is_active && a.name.to_lowercase() == lower)
    }
}
