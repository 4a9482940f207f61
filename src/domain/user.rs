//! User entity and its public view.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Database row shape for a user record
pub(crate) type UserRow = (
    Uuid,                // id
    String,              // username
    String,              // email
    String,              // password_hash
    String,              // full_name
    Option<String>,      // phone_number
    DateTime<Utc>,       // created_at
    DateTime<Utc>,       // updated_at
);

/// Column list matching [`UserRow`]
pub(crate) const USER_COLUMNS: &str =
    "id, username, email, password_hash, full_name, phone_number, created_at, updated_at";

/// A registered user.
///
/// Carries the password hash; never serialize this directly — expose
/// [`PublicUser`] instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Public view of this user, safe to return to any caller.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let (id, username, email, password_hash, full_name, phone_number, created_at, updated_at) =
            row;
        Self {
            id,
            username,
            email,
            password_hash,
            full_name,
            phone_number,
            created_at,
            updated_at,
        }
    }
}

/// Credential-free user view exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
}
