use chrono::Duration;
use chrono::Utc;

use super::claims::TokenClaims;
use super::claims::TokenKind;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Issues and verifies access and refresh tokens.
///
/// Tokens are stateless: nothing is stored server side and a token stays
/// valid until it expires.
pub struct TokenIssuer {
    jwt_handler: JwtHandler,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 30;
    pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

    /// Create an issuer with the default lifetimes (30 minutes / 7 days).
    ///
    /// # Arguments
    /// * `secret` - Shared HMAC secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            access_ttl: Duration::minutes(Self::DEFAULT_ACCESS_TTL_MINUTES),
            refresh_ttl: Duration::days(Self::DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    /// Set access token lifetime.
    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Set refresh token lifetime.
    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue a short-lived access token for a subject.
    pub fn issue_access(&self, subject: impl ToString) -> Result<String, JwtError> {
        self.issue(subject, TokenKind::Access, self.access_ttl)
    }

    /// Issue a long-lived refresh token for a subject.
    pub fn issue_refresh(&self, subject: impl ToString) -> Result<String, JwtError> {
        self.issue(subject, TokenKind::Refresh, self.refresh_ttl)
    }

    fn issue(&self, subject: impl ToString, kind: TokenKind, ttl: Duration) -> Result<String, JwtError> {
        let claims = TokenClaims::new(subject, kind, Utc::now(), ttl)?;
        self.jwt_handler.encode(&claims)
    }

    /// Verify signature and expiry of a token of any kind.
    ///
    /// # Errors
    /// * `TokenExpired` - Current time is at or past the expiry instant
    /// * `InvalidToken` - Signature check failed or payload is malformed
    pub fn verify(&self, token: &str) -> Result<TokenClaims, JwtError> {
        let claims: TokenClaims = self.jwt_handler.decode(token)?;

        if claims.is_expired(Utc::now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }

    /// Verify a token and require it to be of the expected kind.
    ///
    /// # Errors
    /// * `TokenExpired` - Token has expired
    /// * `InvalidToken` - Token is invalid or of the wrong kind
    pub fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, JwtError> {
        let claims = self.verify(token)?;

        if claims.kind != expected {
            return Err(JwtError::InvalidToken(format!(
                "expected {} token, got {} token",
                expected, claims.kind
            )));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn test_issue_and_verify_access() {
        let issuer = TokenIssuer::new(SECRET);

        let token = issuer.issue_access(42).expect("Failed to issue token");
        let claims = issuer.verify(&token).expect("Failed to verify token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_issue_and_verify_refresh() {
        let issuer = TokenIssuer::new(SECRET);

        let token = issuer.issue_refresh(42).expect("Failed to issue token");
        let claims = issuer
            .verify_kind(&token, TokenKind::Refresh)
            .expect("Failed to verify token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_custom_lifetimes() {
        let issuer = TokenIssuer::new(SECRET)
            .with_access_ttl(Duration::minutes(5))
            .with_refresh_ttl(Duration::days(1));

        let access = issuer.verify(&issuer.issue_access("1").unwrap()).unwrap();
        let refresh = issuer.verify(&issuer.issue_refresh("1").unwrap()).unwrap();

        assert_eq!(access.exp - access.iat, 5 * 60);
        assert_eq!(refresh.exp - refresh.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_kind_is_invalid() {
        let issuer = TokenIssuer::new(SECRET);

        let access = issuer.issue_access(1).unwrap();
        let refresh = issuer.issue_refresh(1).unwrap();

        assert!(matches!(
            issuer.verify_kind(&access, TokenKind::Refresh),
            Err(JwtError::InvalidToken(_))
        ));
        assert!(matches!(
            issuer.verify_kind(&refresh, TokenKind::Access),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let issuer = TokenIssuer::new(SECRET).with_access_ttl(Duration::seconds(-5));

        let token = issuer.issue_access(1).unwrap();

        assert_eq!(issuer.verify(&token).unwrap_err(), JwtError::TokenExpired);
    }

    #[test]
    fn test_expires_at_expiry_instant() {
        let issuer = TokenIssuer::new(SECRET).with_access_ttl(Duration::zero());

        let token = issuer.issue_access(1).unwrap();

        assert_eq!(issuer.verify(&token).unwrap_err(), JwtError::TokenExpired);
    }

    #[test]
    fn test_oversized_lifetime_fails_to_issue() {
        let issuer = TokenIssuer::new(SECRET).with_refresh_ttl(Duration::MAX);

        assert!(matches!(
            issuer.issue_refresh(1),
            Err(JwtError::EncodingFailed(_))
        ));
        assert!(issuer.issue_access(1).is_ok());
    }

    #[test]
    fn test_token_from_other_secret_is_invalid() {
        let issuer = TokenIssuer::new(SECRET);
        let other = TokenIssuer::new(b"another_secret_key_at_least_32_bytes");

        let token = other.issue_access(1).unwrap();

        assert!(matches!(issuer.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_tokens_are_distinct() {
        let issuer = TokenIssuer::new(SECRET);

        let first = issuer.issue_access(1).unwrap();
        let second = issuer.issue_access(1).unwrap();

        assert_ne!(first, second);
    }
}
