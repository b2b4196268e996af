use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Config {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Number of iterations
    pub time_cost: u32,
    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// Password hashing implementation.
///
/// Hashes with Argon2id using the configured cost parameters. Verification
/// reads the parameters back from the stored PHC string, so hashes produced
/// under older settings keep verifying after the settings change.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Create a password hasher with explicit cost parameters.
    ///
    /// # Arguments
    /// * `config` - Argon2id memory cost, time cost and parallelism
    ///
    /// # Returns
    /// PasswordHasher instance
    ///
    /// # Errors
    /// * `InvalidParameters` - Parameters are outside the ranges accepted by Argon2
    pub fn new(config: &Argon2Config) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_cost,
            config.time_cost,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::InvalidParameters(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password securely.
    ///
    /// A fresh random salt is generated on every call, so hashing the same
    /// password twice yields two different strings.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// A hash that cannot be parsed is treated as a mismatch.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `hash` - Stored password hash in PHC string format
    ///
    /// # Returns
    /// True if password matches, false otherwise
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(&Argon2Config {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        })
        .expect("Valid Argon2 parameters")
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = fast_hasher();

        let first = hasher.hash("Aa1!aaaaaaaa").expect("Failed to hash password");
        let second = hasher.hash("Aa1!aaaaaaaa").expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(hasher.verify("Aa1!aaaaaaaa", &first));
        assert!(hasher.verify("Aa1!aaaaaaaa", &second));
    }

    #[test]
    fn test_hash_embeds_parameters() {
        let hasher = fast_hasher();
        let hash = hasher.hash("password").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    #[test]
    fn test_default_configuration_parameters() {
        let hasher = PasswordHasher::new(&Argon2Config::default()).expect("Valid defaults");
        let hash = hasher.hash("password").expect("Failed to hash password");

        assert!(hash.contains("m=65536,t=3,p=4"));
        assert!(hasher.verify("password", &hash));
    }

    #[test]
    fn test_verify_with_different_configuration() {
        let hash = fast_hasher().hash("password").expect("Failed to hash password");

        let other = PasswordHasher::new(&Argon2Config {
            memory_cost: 2048,
            time_cost: 2,
            parallelism: 1,
        })
        .unwrap();

        assert!(other.verify("password", &hash));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = fast_hasher();

        assert!(!hasher.verify("password", "invalid_hash"));
        assert!(!hasher.verify("password", ""));
        assert!(!hasher.verify("password", "$argon2id$v=19$m=1024,t=1,p=1$broken"));
    }

    #[test]
    fn test_invalid_parameters() {
        let result = PasswordHasher::new(&Argon2Config {
            memory_cost: 1,
            time_cost: 0,
            parallelism: 1,
        });

        assert!(matches!(result, Err(PasswordError::InvalidParameters(_))));
    }
}
