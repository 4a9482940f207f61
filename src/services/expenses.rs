//! Obligation ledger
//!
//! Records debt obligations between a creator and a debtor and enforces
//! their access rules: only the creator may mutate or delete, creator and
//! debtor both may read.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Amount, Expense, ExpenseRow, ExpenseStatus, ExpenseView, PublicUser, User, EXPENSE_COLUMNS,
};
use crate::error::{AppError, AppResult};

use super::users::UserService;

/// Expense fields supplied by the creator on create and update
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub description: String,
    pub amount: Amount,
    pub debtor_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// On create: defaults to `Pending` when omitted.
    /// On update: the stored status is retained when omitted.
    pub status: Option<ExpenseStatus>,
}

/// Expense persistence and authorization service
#[derive(Clone)]
pub struct ExpenseService {
    pool: PgPool,
    users: UserService,
}

impl ExpenseService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserService::new(pool.clone()),
            pool,
        }
    }

    /// Record a new expense owed to `creator`.
    ///
    /// The self-debt check runs before the debtor lookup so a self-owed
    /// expense reports the clearer error even if the id is also unknown.
    pub async fn create(&self, creator: &User, input: ExpenseInput) -> AppResult<ExpenseView> {
        if input.debtor_id == creator.id {
            return Err(AppError::InvalidOperation(
                "Cannot create expense for yourself".to_string(),
            ));
        }

        let debtor = self.users.find_by_id(input.debtor_id).await?;

        let status = input.status.unwrap_or_default();
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO expenses (id, description, amount, creator_id, debtor_id, status, due_date, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            "#,
        )
        .bind(id)
        .bind(&input.description)
        .bind(input.amount.value())
        .bind(creator.id)
        .bind(debtor.id)
        .bind(status.as_str())
        .bind(input.due_date)
        .bind(&input.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let expense = Expense {
            id,
            description: input.description,
            amount: input.amount.value(),
            creator_id: creator.id,
            debtor_id: debtor.id,
            status,
            due_date: input.due_date,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        Ok(Self::build_view(
            expense,
            creator.to_public(),
            debtor.to_public(),
        ))
    }

    /// All expenses where `user` is creator or debtor, newest first.
    pub async fn list_all(&self, user: &User) -> AppResult<Vec<ExpenseView>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS} FROM expenses
            WHERE creator_id = $1 OR debtor_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        self.to_views(rows).await
    }

    /// Expenses created by `user`, newest first.
    pub async fn list_created(&self, user: &User) -> AppResult<Vec<ExpenseView>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS} FROM expenses
            WHERE creator_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        self.to_views(rows).await
    }

    /// Expenses where `user` is the debtor, newest first.
    pub async fn list_as_debtor(&self, user: &User) -> AppResult<Vec<ExpenseView>> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS} FROM expenses
            WHERE debtor_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        self.to_views(rows).await
    }

    /// Expenses between `user` and `other_id`, in either direction, newest
    /// first.
    pub async fn list_between(&self, user: &User, other_id: Uuid) -> AppResult<Vec<ExpenseView>> {
        // Resolve first so an unknown counterparty is NotFound, not an
        // empty list
        let other = self.users.find_by_id(other_id).await?;

        let rows: Vec<ExpenseRow> = sqlx::query_as(&format!(
            r#"
            SELECT {EXPENSE_COLUMNS} FROM expenses
            WHERE (creator_id = $1 AND debtor_id = $2)
               OR (creator_id = $2 AND debtor_id = $1)
            ORDER BY created_at DESC
            "#
        ))
        .bind(user.id)
        .bind(other.id)
        .fetch_all(&self.pool)
        .await?;

        self.to_views(rows).await
    }

    /// Read a single expense.
    ///
    /// Fails with `NotFound` if absent and `AccessDenied` unless the
    /// requester is the creator or the debtor.
    pub async fn get(&self, id: Uuid, requester: &User) -> AppResult<ExpenseView> {
        let expense = self.fetch(id).await?;

        if !expense.is_visible_to(requester.id) {
            return Err(AppError::AccessDenied(
                "Access denied to this expense".to_string(),
            ));
        }

        self.to_view(expense).await
    }

    /// Replace the mutable fields of an expense.
    ///
    /// Only the creator may update; the debtor has read access but no
    /// write access. A debtor change re-validates the self-debt invariant
    /// and the new debtor's existence. Status is replaced only when
    /// provided.
    pub async fn update(
        &self,
        id: Uuid,
        requester: &User,
        input: ExpenseInput,
    ) -> AppResult<ExpenseView> {
        let expense = self.fetch(id).await?;

        if !expense.is_owned_by(requester.id) {
            return Err(AppError::AccessDenied(
                "You can only update expenses you created".to_string(),
            ));
        }

        if input.debtor_id != expense.debtor_id {
            if input.debtor_id == requester.id {
                return Err(AppError::InvalidOperation(
                    "Cannot create expense for yourself".to_string(),
                ));
            }
            self.users.find_by_id(input.debtor_id).await?;
        }

        let status = input.status.unwrap_or(expense.status);
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE expenses
            SET description = $2, amount = $3, debtor_id = $4, status = $5,
                due_date = $6, notes = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.description)
        .bind(input.amount.value())
        .bind(input.debtor_id)
        .bind(status.as_str())
        .bind(input.due_date)
        .bind(&input.notes)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let updated = Expense {
            description: input.description,
            amount: input.amount.value(),
            debtor_id: input.debtor_id,
            status,
            due_date: input.due_date,
            notes: input.notes,
            updated_at: now,
            ..expense
        };

        self.to_view(updated).await
    }

    /// Delete an expense. Only the creator may delete.
    pub async fn delete(&self, id: Uuid, requester: &User) -> AppResult<()> {
        let expense = self.fetch(id).await?;

        if !expense.is_owned_by(requester.id) {
            return Err(AppError::AccessDenied(
                "You can only delete expenses you created".to_string(),
            ));
        }

        sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Load an expense row, failing with `NotFound` if absent.
    async fn fetch(&self, id: Uuid) -> AppResult<Expense> {
        let row: Option<ExpenseRow> = sqlx::query_as(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| AppError::NotFound("Expense not found".to_string()))?;

        // An unknown status string in storage is data corruption
        Expense::try_from(row).map_err(|e| AppError::Internal(e.to_string()))
    }

    async fn to_view(&self, expense: Expense) -> AppResult<ExpenseView> {
        let creator = self.users.find_by_id(expense.creator_id).await?.to_public();
        let debtor = self.users.find_by_id(expense.debtor_id).await?.to_public();
        Ok(Self::build_view(expense, creator, debtor))
    }

    /// Convert rows to views, resolving each referenced user once.
    async fn to_views(&self, rows: Vec<ExpenseRow>) -> AppResult<Vec<ExpenseView>> {
        let mut resolved: HashMap<Uuid, PublicUser> = HashMap::new();
        let mut views = Vec::with_capacity(rows.len());

        for row in rows {
            let expense = Expense::try_from(row).map_err(|e| AppError::Internal(e.to_string()))?;

            for user_id in [expense.creator_id, expense.debtor_id] {
                if !resolved.contains_key(&user_id) {
                    let user = self.users.find_by_id(user_id).await?;
                    resolved.insert(user_id, user.to_public());
                }
            }

            let creator = resolved[&expense.creator_id].clone();
            let debtor = resolved[&expense.debtor_id].clone();
            views.push(Self::build_view(expense, creator, debtor));
        }

        Ok(views)
    }

    fn build_view(expense: Expense, creator: PublicUser, debtor: PublicUser) -> ExpenseView {
        ExpenseView {
            id: expense.id,
            description: expense.description,
            amount: expense.amount,
            creator,
            debtor,
            status: expense.status,
            created_at: expense.created_at,
            updated_at: expense.updated_at,
            due_date: expense.due_date,
            notes: expense.notes,
        }
    }
}
