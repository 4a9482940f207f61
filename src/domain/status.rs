//! Expense status
//!
//! Closed set of lifecycle states for an expense. Any state may be replaced
//! by any other through an update from the creator; there is no enforced
//! transition graph.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of an expense obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpenseStatus {
    /// Debt is open and unpaid
    Pending,
    /// Debt has been settled
    Paid,
    /// Debt was voided by the creator
    Cancelled,
}

impl ExpenseStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "PENDING",
            ExpenseStatus::Paid => "PAID",
            ExpenseStatus::Cancelled => "CANCELLED",
        }
    }
}

impl Default for ExpenseStatus {
    fn default() -> Self {
        ExpenseStatus::Pending
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown status strings coming from storage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown expense status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for ExpenseStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ExpenseStatus::Pending),
            "PAID" => Ok(ExpenseStatus::Paid),
            "CANCELLED" => Ok(ExpenseStatus::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}
