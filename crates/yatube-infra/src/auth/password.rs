//! Argon2 password hashing implementation.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use yatube_core::ports::{AuthError, PasswordService};

/// Argon2-based password service.
pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    /// A stored value that is not a PHC hash string, such as the `!`
    /// unusable-password marker, never matches.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            tracing::debug!("Stored password hash is not a PHC string");
            return Ok(false);
        };

        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = Argon2PasswordService::new();

        let hash = service.hash("Тестовый-пароль-1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(service.verify("Тестовый-пароль-1", &hash).unwrap());
        assert!(!service.verify("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = Argon2PasswordService::new();
        assert_ne!(service.hash("same").unwrap(), service.hash("same").unwrap());
    }

    #[test]
    fn test_unusable_hash_never_matches() {
        let service = Argon2PasswordService::new();
        assert!(!service.verify("password", "!").unwrap());
        assert!(!service.verify("password", "not-a-hash").unwrap());
    }
}
