//! Password hashing and verification
//!
//! Passwords are stored only as Argon2id hashes in PHC string format. Every
//! hash gets its own random salt, so hashing the same password twice yields
//! two different strings that both verify.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

/// Hash a plaintext password with Argon2id
///
/// # Errors
///
/// Returns an error if the hasher rejects its input (does not happen with the
/// default parameters)
///
/// # Example
///
/// ```
/// use fittrack::auth::password::{hash_password, verify_password};
///
/// let hash = hash_password("correct horse").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// assert!(verify_password("correct horse", &hash));
/// ```
pub fn hash_password(plaintext: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::HashFailed(e.to_string()))
}

/// Check a plaintext password against a stored hash
///
/// Returns `false` for a mismatch and for a stored value that is not a
/// parseable PHC string.
pub fn verify_password(plaintext: &str, hashed: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hashed) else {
        return false;
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Error type for password hashing
#[derive(Debug, Clone, PartialEq)]
pub enum HashError {
    HashFailed(String),
}

impl std::fmt::Display for HashError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HashError::HashFailed(msg) => write!(f, "Password hashing failed: {}", msg),
        }
    }
}

impl std::error::Error for HashError {}
