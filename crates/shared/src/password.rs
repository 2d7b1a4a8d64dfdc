//! Password hashing (Argon2id) and password policy checks.

use std::collections::HashSet;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use serde::Deserialize;
use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// OWASP 2024 baseline: 19 MiB, 2 iterations, 1 lane.
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password into a PHC string.
///
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("Sofia-2024!").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// The parameters embedded in the hash are used, so older hashes keep working.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Account password rules, loaded from the `identity` configuration section.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordPolicy {
    #[serde(default = "default_true")]
    pub require_digit: bool,
    #[serde(default = "default_true")]
    pub require_lowercase: bool,
    #[serde(default = "default_true")]
    pub require_uppercase: bool,
    #[serde(default)]
    pub require_non_alphanumeric: bool,
    #[serde(default = "default_required_length")]
    pub required_length: usize,
    #[serde(default = "default_required_unique_chars")]
    pub required_unique_chars: usize,
}

fn default_true() -> bool {
    true
}
fn default_required_length() -> usize {
    6
}
fn default_required_unique_chars() -> usize {
    1
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: false,
            required_length: default_required_length(),
            required_unique_chars: default_required_unique_chars(),
        }
    }
}

impl PasswordPolicy {
    /// Returns every rule the password breaks. Empty means acceptable.
    pub fn violations(&self, password: &str) -> Vec<String> {
        let mut problems = Vec::new();

        if password.chars().count() < self.required_length {
            problems.push(format!(
                "Password must be at least {} characters",
                self.required_length
            ));
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("Password must contain a digit".to_string());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            problems.push("Password must contain a lowercase letter".to_string());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            problems.push("Password must contain an uppercase letter".to_string());
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_alphanumeric()) {
            problems.push("Password must contain a non-alphanumeric character".to_string());
        }

        let unique: HashSet<char> = password.chars().collect();
        if unique.len() < self.required_unique_chars {
            problems.push(format!(
                "Password must contain at least {} unique characters",
                self.required_unique_chars
            ));
        }

        problems
    }

    pub fn check(&self, password: &str) -> Result<(), String> {
        let problems = self.violations(password);
        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Plovdiv#1").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert!(verify_password("Plovdiv#1", &hash).unwrap());
        assert!(!verify_password("plovdiv#1", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let result = verify_password("password", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_default_policy() {
        let policy = PasswordPolicy::default();
        assert!(policy.check("Varna2024").is_ok());
        assert!(policy.check("varna2024").is_err());
        assert!(policy.check("VARNA2024").is_err());
        assert!(policy.check("VarnaVarna").is_err());
        assert!(policy.check("Va1").is_err());
    }

    #[test]
    fn test_non_alphanumeric_and_unique_chars() {
        let policy = PasswordPolicy {
            require_digit: false,
            require_lowercase: false,
            require_uppercase: false,
            require_non_alphanumeric: true,
            required_length: 4,
            required_unique_chars: 3,
        };

        let problems = policy.violations("aaaa");
        assert_eq!(problems.len(), 2);
        assert!(policy.check("ab-c").is_ok());
    }

    #[test]
    fn test_policy_deserializes_with_defaults() {
        let policy: PasswordPolicy = serde_json::from_str(r#"{"required_length": 10}"#).unwrap();
        assert_eq!(policy.required_length, 10);
        assert!(policy.require_digit);
        assert!(!policy.require_non_alphanumeric);
    }
}
