use async_trait::async_trait;
use auth::TokenPair;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::Access;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::RegisterCommand;
use crate::user::models::User;

/// Port for authentication and authorization.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new regular, active account.
    ///
    /// # Errors
    /// * `EmailAlreadyRegistered` - Email belongs to an existing account
    /// * `UsernameAlreadyTaken` - Username belongs to an existing account
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError>;

    /// Exchange credentials for an access/refresh token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown identifier or wrong password
    /// * `InactiveAccount` - Password matched but the account is disabled
    async fn authenticate(&self, credentials: Credentials) -> Result<TokenPair, AuthError>;

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Token invalid, expired, of the wrong kind, or
    ///   its user is missing or inactive
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Resolve the acting user from an access token and enforce `access`.
    ///
    /// # Errors
    /// * `InvalidAccessToken` - Token unusable or user missing
    /// * `AccountDisabled` - User is inactive
    /// * `InsufficientPrivileges` - Superuser required
    /// * `RoleRequired` - Role outside the allowed set
    async fn authorize(&self, access_token: &str, access: &Access) -> Result<User, AuthError>;
}
