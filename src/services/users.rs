//! Identity store
//!
//! User persistence: lookups, existence checks, search, and registration
//! inserts. Everything else in the system resolves users through this
//! service.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{PublicUser, User, UserRow, USER_COLUMNS};
use crate::error::{AppError, AppResult};

/// Fields required to persist a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

/// User lookup and registration service
#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by id, failing with `NotFound` if absent.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<User> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::from)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Find a user by username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    pub async fn exists_by_username(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Case-insensitive substring search over username, email, and full
    /// name. Ordered by username for deterministic results.
    pub async fn search(&self, query: &str) -> AppResult<Vec<PublicUser>> {
        let pattern = format!("%{}%", query);

        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE username ILIKE $1 OR email ILIKE $1 OR full_name ILIKE $1
            ORDER BY username ASC
            "#
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| User::from(row).to_public())
            .collect())
    }

    /// Persist a new user.
    ///
    /// Fails with `Conflict` if the username or email is already taken. The
    /// uniqueness check and insert run in one transaction; the unique
    /// indexes on the table back the check against concurrent registration.
    pub async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let username_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(&new_user.username)
                .fetch_one(&mut *tx)
                .await?;
        if username_taken {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let email_taken: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(&new_user.email)
                .fetch_one(&mut *tx)
                .await?;
        if email_taken {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, full_name, phone_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            "#,
        )
        .bind(id)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.full_name)
        .bind(&new_user.phone_number)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(User {
            id,
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            phone_number: new_user.phone_number,
            created_at: now,
            updated_at: now,
        })
    }
}
