//! Business services
//!
//! One service per component: credential service, identity store,
//! relationship registry, and obligation ledger. Each holds a `PgPool`
//! and is constructed per request by the handlers.

mod auth;
mod customers;
mod expenses;
mod users;

pub use auth::{AuthService, RegisterCommand};
pub use customers::CustomerService;
pub use expenses::{ExpenseInput, ExpenseService};
pub use users::{NewUser, UserService};
