mod account;
mod budget;
mod category;
mod fixed_expense;
mod settings;
mod transaction;

pub use account::{Account, AccountKind};
pub use budget::{AllocationMode, BudgetRow};
pub use category::{Category, CategoryKind};
pub use fixed_expense::FixedExpense;
pub use settings::Settings;
pub use transaction::{Transaction, TransactionKind};

#[cfg(test)]
mod tests;
