//! Credential hashing
//!
//! Passwords are stored as Argon2 PHC strings. Verification recomputes the
//! digest and compares it in constant time inside `argon2`.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub use argon2::password_hash::Error as CredentialError;

/// Hash a plaintext password into a PHC string suitable for `users.password_hash`
pub fn hash_password(plain: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a plaintext password against a stored PHC string.
///
/// Returns `Ok(false)` on mismatch and `Err` only when the stored hash itself
/// is malformed.
pub fn verify_password(plain: &str, stored_hash: &str) -> Result<bool, CredentialError> {
    let parsed = PasswordHash::new(stored_hash)?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(CredentialError::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Burn the same verification cost as a real check when no user matched.
pub fn verify_against_dummy(plain: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| match hash_password("dummy-password-for-timing") {
        Ok(hash) => Some(hash),
        Err(e) => {
            tracing::warn!(error = %e, "failed to prepare dummy password hash");
            None
        }
    });

    if let Some(hash) = dummy {
        let _ = verify_password(plain, hash);
    }
}
