//! Domain types
//!
//! Value objects and entities with their invariants.

mod amount;
mod customer;
mod expense;
mod password;
mod status;
mod user;

pub use amount::{Amount, AmountError};
pub use customer::Customer;
pub use expense::{Expense, ExpenseView};
pub use password::{Password, PasswordError, MIN_PASSWORD_LENGTH};
pub use status::{ExpenseStatus, ParseStatusError};
pub use user::{PublicUser, User};

pub(crate) use expense::{ExpenseRow, EXPENSE_COLUMNS};
pub(crate) use user::{UserRow, USER_COLUMNS};
