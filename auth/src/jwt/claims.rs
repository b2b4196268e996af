use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Purpose of a token.
///
/// Serialized into the `type` claim. A token is only accepted by operations
/// expecting its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim set carried by access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (user identifier)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID, unique per issued token
    pub jti: String,

    /// Token kind
    #[serde(rename = "type")]
    pub kind: TokenKind,
}

impl TokenClaims {
    /// Create claims for a subject expiring `ttl` after `now`.
    ///
    /// # Arguments
    /// * `subject` - Unique subject identifier
    /// * `kind` - Access or refresh
    /// * `now` - Issue instant
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    /// Claims with sub, exp, iat, jti and type set
    ///
    /// # Errors
    /// * `EncodingFailed` - Expiry instant is out of the representable range
    pub fn new(
        subject: impl ToString,
        kind: TokenKind,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, JwtError> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            JwtError::EncodingFailed(format!("{} token lifetime out of range", kind))
        })?;

        Ok(Self {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: random_token_id(),
            kind,
        })
    }

    /// Check if token is expired.
    ///
    /// A token is expired from its expiry instant onwards.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}

fn random_token_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let now = Utc::now();
        let claims = TokenClaims::new(42, TokenKind::Access, now, Duration::minutes(30)).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert_eq!(claims.jti.len(), 32);
    }

    #[test]
    fn test_token_ids_are_unique() {
        let now = Utc::now();
        let first = TokenClaims::new("1", TokenKind::Refresh, now, Duration::days(7)).unwrap();
        let second = TokenClaims::new("1", TokenKind::Refresh, now, Duration::days(7)).unwrap();

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let result = TokenClaims::new("1", TokenKind::Refresh, Utc::now(), Duration::MAX);

        assert!(matches!(result, Err(JwtError::EncodingFailed(_))));
    }

    #[test]
    fn test_is_expired() {
        let claims = TokenClaims {
            sub: "1".to_string(),
            exp: 1000,
            iat: 900,
            jti: "id".to_string(),
            kind: TokenKind::Access,
        };

        assert!(!claims.is_expired(999));
        assert!(claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn test_kind_serializes_as_type_claim() {
        let claims =
            TokenClaims::new("7", TokenKind::Refresh, Utc::now(), Duration::days(1)).unwrap();
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["type"], "refresh");
        assert_eq!(json["sub"], "7");
    }
}
