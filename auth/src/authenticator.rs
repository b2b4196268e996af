use crate::jwt::JwtError;
use crate::jwt::TokenClaims;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenKind;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password hashing and token issuance.
///
/// Holds no per-user state, so a single instance can be shared behind an
/// `Arc` by every request.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_issuer: TokenIssuer,
}

/// Access/refresh token pair issued on login and refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived JWT access token
    pub access_token: String,
    /// Long-lived JWT refresh token
    pub refresh_token: String,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `password_hasher` - Configured Argon2id hasher
    /// * `token_issuer` - Configured token issuer
    ///
    /// # Returns
    /// Configured Authenticator instance
    pub fn new(password_hasher: PasswordHasher, token_issuer: TokenIssuer) -> Self {
        Self {
            password_hasher,
            token_issuer,
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// Malformed hashes never match.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Issue a fresh access/refresh pair for a subject.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token_pair(&self, subject: impl ToString) -> Result<TokenPair, JwtError> {
        let subject = subject.to_string();

        Ok(TokenPair {
            access_token: self.token_issuer.issue_access(&subject)?,
            refresh_token: self.token_issuer.issue_refresh(&subject)?,
        })
    }

    /// Validate a token and require the given kind.
    ///
    /// # Errors
    /// * `TokenExpired` - Token has expired
    /// * `InvalidToken` - Bad signature, malformed payload or wrong kind
    pub fn verify_token(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, JwtError> {
        self.token_issuer.verify_kind(token, kind)
    }
}
