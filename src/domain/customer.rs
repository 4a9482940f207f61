//! Customer relationship edge.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A directed "has-customer" edge between two users.
///
/// # Invariants
/// - `user_id != customer_user_id` (no self-edge)
/// - At most one edge per (user_id, customer_user_id) pair
///
/// Both invariants are enforced by the registry and backed by database
/// constraints.
#[derive(Debug, Clone)]
pub struct Customer {
    pub id: Uuid,
    /// The user who owns the relationship
    pub user_id: Uuid,
    /// The user being tracked as a customer
    pub customer_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
