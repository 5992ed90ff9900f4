#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Expense,
    Income,
    /// System categories used to tag fixed expenses.
    Fixed,
    /// The single pseudo-category that carries the monthly savings budget row.
    Savings,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Fixed => "fixed",
            Self::Savings => "savings",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "income" => Self::Income,
            "fixed" | "fixed_system" => Self::Fixed,
            "savings" => Self::Savings,
            _ => Self::Expense,
        }
    }
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
            Self::Fixed => write!(f, "Fixed"),
            Self::Savings => write!(f, "Savings"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub kind: CategoryKind,
    pub icon: String,
    pub is_active: bool,
}

impl Category {
    pub fn new(name: String, kind: CategoryKind) -> Self {
        Self {
            id: None,
            name,
            kind,
            icon: String::new(),
            is_active: true,
        }
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// Find a category by ID in a slice.
    pub fn find_by_id(categories: &[Category], id: i64) -> Option<&Category> {
        categories.iter().find(|c| c.id == Some(id))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
