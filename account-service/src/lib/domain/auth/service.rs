use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::TokenKind;
use auth::TokenPair;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::hashing;
use crate::domain::auth::models::Access;
use crate::domain::auth::models::Credentials;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::user::errors::UserError;
use crate::user::models::NewUser;
use crate::user::models::Role;
use crate::user::models::User;
use crate::user::models::UserId;
use crate::user::ports::UserRepository;

/// Registration, login, token refresh and request authorization.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    placeholder_hash: OnceCell<String>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hasher and token issuer
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
            placeholder_hash: OnceCell::new(),
        }
    }

    /// Spend one password verification on a hash no password matches, so an
    /// unknown identifier takes as long as a wrong password.
    async fn verify_against_placeholder(&self, password: String) {
        let placeholder = self
            .placeholder_hash
            .get_or_try_init(|| {
                hashing::hash_password(&self.authenticator, Uuid::new_v4().simple().to_string())
            })
            .await;

        match placeholder {
            Ok(hash) => {
                hashing::verify_password(&self.authenticator, password, hash.clone()).await;
            }
            Err(e) => tracing::error!(error = %e, "Placeholder password hash unavailable"),
        }
    }

    async fn resolve_subject(&self, subject: &str) -> Result<Option<User>, UserError> {
        match UserId::from_string(subject) {
            Ok(id) => self.repository.find_by_id(&id).await,
            Err(e) => {
                tracing::debug!(error = %e, "Token subject is not a user id");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError> {
        if self.repository.find_by_email(&command.email).await?.is_some() {
            tracing::warn!(reason = "email_taken", "Registration rejected");
            return Err(AuthError::EmailAlreadyRegistered);
        }

        if self
            .repository
            .find_by_username(&command.username)
            .await?
            .is_some()
        {
            tracing::warn!(
                username = %command.username,
                reason = "username_taken",
                "Registration rejected"
            );
            return Err(AuthError::UsernameAlreadyTaken);
        }

        let password_hash = hashing::hash_password(&self.authenticator, command.password).await?;

        let new_user = NewUser {
            email: command.email,
            username: command.username,
            full_name: command.full_name,
            password_hash,
            is_active: true,
            is_superuser: false,
            role: Role::User,
        };

        // A concurrent registration can still win the race between lookup and insert.
        let user = self
            .repository
            .create(new_user)
            .await
            .map_err(|e| match e {
                UserError::EmailAlreadyExists(_) => AuthError::EmailAlreadyRegistered,
                UserError::UsernameAlreadyExists(_) => AuthError::UsernameAlreadyTaken,
                other => AuthError::User(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    async fn authenticate(&self, credentials: Credentials) -> Result<TokenPair, AuthError> {
        let Credentials {
            identifier,
            password,
        } = credentials;

        let user = match self
            .repository
            .find_by_email_or_username(&identifier)
            .await?
        {
            Some(user) => user,
            None => {
                self.verify_against_placeholder(password).await;
                tracing::warn!(reason = "unknown_user", "Login failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let matches =
            hashing::verify_password(&self.authenticator, password, user.password_hash.clone())
                .await;
        if !matches {
            tracing::warn!(user_id = %user.id, reason = "wrong_password", "Login failed");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            tracing::warn!(user_id = %user.id, reason = "inactive", "Login failed");
            return Err(AuthError::InactiveAccount);
        }

        let pair = self.authenticator.issue_token_pair(user.id)?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self
            .authenticator
            .verify_token(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::warn!(error = %e, reason = "bad_token", "Refresh rejected");
                AuthError::InvalidRefreshToken
            })?;

        let user = match self.resolve_subject(&claims.sub).await? {
            Some(user) if user.is_active => user,
            Some(user) => {
                tracing::warn!(user_id = %user.id, reason = "inactive", "Refresh rejected");
                return Err(AuthError::InvalidRefreshToken);
            }
            None => {
                tracing::warn!(reason = "unknown_user", "Refresh rejected");
                return Err(AuthError::InvalidRefreshToken);
            }
        };

        let pair = self.authenticator.issue_token_pair(user.id)?;
        tracing::debug!(user_id = %user.id, "Tokens refreshed");

        Ok(pair)
    }

    async fn authorize(&self, access_token: &str, access: &Access) -> Result<User, AuthError> {
        let claims = self
            .authenticator
            .verify_token(access_token, TokenKind::Access)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                AuthError::InvalidAccessToken
            })?;

        let user = self
            .resolve_subject(&claims.sub)
            .await?
            .ok_or(AuthError::InvalidAccessToken)?;

        access.check(&user).inspect_err(|e| {
            tracing::warn!(user_id = %user.id, error = %e, "Authorization denied");
        })?;

        Ok(user)
    }
}
