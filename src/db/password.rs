// Password hashing using Argon2id
// Hashes are PHC strings, so parameters and salt travel with the hash.

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Well-formed Argon2id hash (default parameters) that no password matches.
/// Verified against when an email is unknown so both login failures cost
/// the same hashing work.
pub const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Zml4ZWRzYWx0Zml4ZWRzYQ$bm8tYWNjb3VudC1kdW1teS1hcmdvbjItb3V0cHV0ISE";

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash
///
/// A malformed stored hash is a server fault, not a failed login.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Failed to parse password hash: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "validPa$$word";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrongPa$$word", &hash).unwrap());
    }

    #[test]
    fn test_dummy_hash_parses_and_never_matches() {
        assert!(!verify_password("", DUMMY_HASH).unwrap());
        assert!(!verify_password("validPa$$word", DUMMY_HASH).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AppError::Internal(_))
        ));
    }
}
