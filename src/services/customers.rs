//! Relationship registry
//!
//! Maintains the directed "has-customer" relation between users. No
//! self-edges, at most one edge per (owner, target) pair.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Customer, PublicUser, User, UserRow, USER_COLUMNS};
use crate::error::{AppError, AppResult};

use super::users::UserService;

/// Customer edge service
#[derive(Clone)]
pub struct CustomerService {
    pool: PgPool,
    users: UserService,
}

impl CustomerService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserService::new(pool.clone()),
            pool,
        }
    }

    /// Add `target_id` to the owner's customer list.
    ///
    /// The self-reference check runs before the target lookup so adding
    /// yourself reports the clearer error even if the id is also unknown.
    pub async fn add(&self, owner: &User, target_id: Uuid) -> AppResult<PublicUser> {
        if target_id == owner.id {
            return Err(AppError::InvalidOperation(
                "Cannot add yourself as customer".to_string(),
            ));
        }

        let target = self.users.find_by_id(target_id).await?;

        let mut tx = self.pool.begin().await?;

        let already_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM customers WHERE user_id = $1 AND customer_user_id = $2)",
        )
        .bind(owner.id)
        .bind(target_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_exists {
            return Err(AppError::Conflict(
                "User is already in your customer list".to_string(),
            ));
        }

        let edge = Customer {
            id: Uuid::new_v4(),
            user_id: owner.id,
            customer_user_id: target.id,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO customers (id, user_id, customer_user_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(edge.id)
        .bind(edge.user_id)
        .bind(edge.customer_user_id)
        .bind(edge.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(target.to_public())
    }

    /// Public views of all customers of `owner`, in insertion order.
    pub async fn list(&self, owner: &User) -> AppResult<Vec<PublicUser>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            r#"
            SELECT {columns} FROM users u
            JOIN customers c ON c.customer_user_id = u.id
            WHERE c.user_id = $1
            ORDER BY c.created_at ASC
            "#,
            columns = USER_COLUMNS
                .split(", ")
                .map(|col| format!("u.{col}"))
                .collect::<Vec<_>>()
                .join(", "),
        ))
        .bind(owner.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| User::from(row).to_public())
            .collect())
    }

    /// Remove the edge from `owner` to `target_id`.
    ///
    /// Fails with `NotFound` if no such edge exists; a second removal of
    /// the same edge fails the same way.
    pub async fn remove(&self, owner: &User, target_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM customers WHERE user_id = $1 AND customer_user_id = $2",
        )
        .bind(owner.id)
        .bind(target_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer not found".to_string()));
        }

        Ok(())
    }
}
