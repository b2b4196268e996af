//! Authentication utilities library
//!
//! Provides the authentication core used by the account service:
//! - Password hashing (Argon2id with configurable cost)
//! - Access/refresh token issuance and verification (HS256 JWT)
//! - Authentication coordination
//!
//! Storage and user lookup live in the service; this crate only deals with
//! secrets, hashes and tokens.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::{Argon2Config, PasswordHasher};
//!
//! let hasher = PasswordHasher::new(&Argon2Config::default()).unwrap();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenIssuer, TokenKind};
//!
//! let issuer = TokenIssuer::new(b"secret_key_at_least_32_bytes_long!");
//! let token = issuer.issue_refresh(42).unwrap();
//! let claims = issuer.verify_kind(&token, TokenKind::Refresh).unwrap();
//! assert_eq!(claims.sub, "42");
//!
//! // An access token is never accepted where a refresh token is expected
//! let access = issuer.issue_access(42).unwrap();
//! assert!(issuer.verify_kind(&access, TokenKind::Refresh).is_err());
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use authenticator::TokenPair;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenClaims;
pub use jwt::TokenIssuer;
pub use jwt::TokenKind;
pub use password::Argon2Config;
pub use password::PasswordError;
pub use password::PasswordHasher;
