//! Credential service
//!
//! Registration and login. Passwords are argon2-hashed at the domain
//! boundary; successful authentication yields a signed bearer token.

use sqlx::PgPool;

use crate::auth::{IssuedToken, TokenService};
use crate::domain::{Password, PasswordError, PublicUser};
use crate::error::{AppError, AppResult};

use super::users::{NewUser, UserService};

/// A syntactically valid argon2 hash that matches no real password.
/// Verified against when the username is unknown so that lookup failures
/// and hash mismatches take comparable time and return the same error.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$vUnJQ9Faj0Hc2xaOHpSJuN8Ylm4d1wT9Wc2r2bOZFO0";

/// Registration input, pre-validated at the boundary
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}

/// Registration and login service
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: TokenService) -> Self {
        Self {
            users: UserService::new(pool),
            tokens,
        }
    }

    /// Register a new user and issue a token for the fresh account.
    ///
    /// Fails with `Conflict` if the username or email is already taken.
    pub async fn register(&self, command: RegisterCommand) -> AppResult<(IssuedToken, PublicUser)> {
        let password = Password::new(&command.password).map_err(|e| match e {
            PasswordError::TooShort => AppError::validation_field("password", &e.to_string()),
            PasswordError::HashFailed(msg) => AppError::Internal(msg),
        })?;

        let user = self
            .users
            .create(NewUser {
                username: command.username,
                email: command.email,
                password_hash: password.as_str().to_string(),
                full_name: command.full_name,
                phone_number: command.phone_number,
            })
            .await?;

        let token = self.tokens.issue(&user)?;
        Ok((token, user.to_public()))
    }

    /// Authenticate by username and password.
    ///
    /// Unknown username and wrong password both fail with the same
    /// `InvalidCredentials` error; a dummy verification runs when the user
    /// is unknown so the two cases are not distinguishable by timing.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<(IssuedToken, PublicUser)> {
        let user = self.users.find_by_username(username).await?;

        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.clone()),
            None => Password::from_hash(DUMMY_HASH.to_string()),
        };

        let password_valid = stored.verify(password);

        let user = match user {
            Some(user) if password_valid => user,
            _ => return Err(AppError::InvalidCredentials),
        };

        let token = self.tokens.issue(&user)?;
        Ok((token, user.to_public()))
    }
}
