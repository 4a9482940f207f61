//! Password type
//!
//! Domain primitive wrapping an argon2 password hash. Plain text passwords
//! exist only transiently; verification is re-hash-and-compare, never
//! decryption.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// A hashed password, stored as a PHC string.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Keep the hash out of debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

/// Errors that can occur when hashing a password
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    TooShort,

    #[error("Password hashing failed: {0}")]
    HashFailed(String),
}

impl Password {
    /// Hash a plain text password.
    ///
    /// # Errors
    /// - `PasswordError::TooShort` if shorter than 8 characters
    /// - `PasswordError::HashFailed` if the hasher fails
    pub fn new(plain_text: &str) -> Result<Self, PasswordError> {
        if plain_text.len() < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashFailed(e.to_string()))?;

        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Wrap an existing hash loaded from storage.
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// The PHC hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Verify a plain text password against this hash.
    pub fn verify(&self, plain_text: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = Password::new("correct-horse").unwrap();
        assert!(password.verify("correct-horse"));
        assert!(!password.verify("wrong-horse"));
    }

    #[test]
    fn test_from_hash_verifies() {
        let password = Password::new("s3cret-pass").unwrap();
        let stored = password.as_str().to_string();

        let restored = Password::from_hash(stored);
        assert!(restored.verify("s3cret-pass"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = Password::new("same-password").unwrap();
        let b = Password::new("same-password").unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_too_short_rejected() {
        let result = Password::new("short");
        assert!(matches!(result, Err(PasswordError::TooShort)));
    }

    #[test]
    fn test_minimum_length_accepted() {
        assert!(Password::new("12345678").is_ok());
    }

    #[test]
    fn test_garbage_hash_never_verifies() {
        let password = Password::from_hash("not-a-phc-string".to_string());
        assert!(!password.verify("anything"));
    }

    #[test]
    fn test_debug_redacts_hash() {
        let password = Password::new("hidden-password").unwrap();
        let debug = format!("{:?}", password);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("argon2"));
    }
}
