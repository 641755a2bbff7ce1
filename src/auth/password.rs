use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;
use tracing::error;

/// Registration password policy from the sign-up form: 8 to 12 characters,
/// both entries identical.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Passwords must match and be between 8 and 12 characters.")]
    PasswordPolicy,
}

pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if (8..=12).contains(&len) && password == confirm {
        Ok(())
    } else {
        Err(ValidationError::PasswordPolicy)
    }
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[test]
    fn rejects_seven_characters() {
        assert_eq!(
            validate_new_password("1234567", "1234567"),
            Err(ValidationError::PasswordPolicy)
        );
    }

    #[test]
    fn rejects_thirteen_characters() {
        assert_eq!(
            validate_new_password("1234567890123", "1234567890123"),
            Err(ValidationError::PasswordPolicy)
        );
    }

    #[test]
    fn rejects_mismatched_confirmation() {
        assert_eq!(
            validate_new_password("password1", "password2"),
            Err(ValidationError::PasswordPolicy)
        );
    }

    #[test]
    fn accepts_bounds_inclusive() {
        assert!(validate_new_password("12345678", "12345678").is_ok());
        assert!(validate_new_password("123456789012", "123456789012").is_ok());
    }
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "growbeans1";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "growbeans1";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("growbeans2", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        assert!(verify_password("whatever", "not-a-phc-string").is_err());
    }
}
