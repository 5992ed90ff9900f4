//! Monthly budget resolution: turning income history, fixed costs, a savings
//! target and per-category pins into a complete allocation for a month.

pub(crate) mod aggregate;
mod carry_forward;
pub(crate) mod month;
mod resolve;
mod session;
mod spec;
mod summary;

pub(crate) use carry_forward::{select_carry_forward, CarryForward};
pub(crate) use resolve::{resolve, Resolution};
pub(crate) use session::{BudgetSession, SessionInputs};
pub(crate) use spec::{Allocation, CategorySpec, MonthContext, SavingsSpec};
pub(crate) use summary::{summarize, CategoryUsage};
