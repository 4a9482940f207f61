//! Expense entity and its API view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::status::ExpenseStatus;
use super::user::PublicUser;

/// Database row shape for an expense record
pub(crate) type ExpenseRow = (
    Uuid,                      // id
    String,                    // description
    Decimal,                   // amount
    Uuid,                      // creator_id
    Uuid,                      // debtor_id
    String,                    // status
    Option<DateTime<Utc>>,     // due_date
    Option<String>,            // notes
    DateTime<Utc>,             // created_at
    DateTime<Utc>,             // updated_at
);

/// Column list matching [`ExpenseRow`]
pub(crate) const EXPENSE_COLUMNS: &str =
    "id, description, amount, creator_id, debtor_id, status, due_date, notes, created_at, updated_at";

/// A recorded debt obligation.
///
/// # Invariants
/// - `creator_id != debtor_id`, enforced at creation and when the debtor
///   changes
/// - `amount` is strictly positive
///
/// Ownership: the creator exclusively may update or delete; creator and
/// debtor both may read.
#[derive(Debug, Clone)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub creator_id: Uuid,
    pub debtor_id: Uuid,
    pub status: ExpenseStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Whether `user_id` may read this expense.
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id || self.debtor_id == user_id
    }

    /// Whether `user_id` may mutate or delete this expense.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id
    }
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = super::status::ParseStatusError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        let (id, description, amount, creator_id, debtor_id, status, due_date, notes, created_at, updated_at) =
            row;
        Ok(Self {
            id,
            description,
            amount,
            creator_id,
            debtor_id,
            status: status.parse()?,
            due_date,
            notes,
            created_at,
            updated_at,
        })
    }
}

/// API view of an expense with nested public user views.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseView {
    pub id: Uuid,
    pub description: String,
    pub amount: Decimal,
    pub creator: PublicUser,
    pub debtor: PublicUser,
    pub status: ExpenseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}
