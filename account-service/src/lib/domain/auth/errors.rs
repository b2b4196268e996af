use thiserror::Error;

use crate::user::errors::UserError;
use crate::user::models::Role;

/// Coarse classification used by inbound adapters to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    Conflict,
    Unauthorized,
    Forbidden,
    Internal,
}

/// Errors raised while registering, authenticating, refreshing or
/// authorizing.
///
/// Token decoding failures never appear here directly; they collapse into
/// `InvalidRefreshToken` or `InvalidAccessToken`.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Username already taken")]
    UsernameAlreadyTaken,

    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveAccount,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Could not validate credentials")]
    InvalidAccessToken,

    #[error("Inactive user")]
    AccountDisabled,

    #[error("Not enough permissions")]
    InsufficientPrivileges,

    #[error("Role must be one of: {}", format_roles(.0))]
    RoleRequired(Vec<Role>),

    #[error("Token error: {0}")]
    Token(#[from] auth::JwtError),

    #[error(transparent)]
    User(#[from] UserError),
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<auth::PasswordError> for AuthError {
    fn from(err: auth::PasswordError) -> Self {
        AuthError::User(UserError::Password(err))
    }
}

impl AuthError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::EmailAlreadyRegistered | AuthError::UsernameAlreadyTaken => {
                AuthErrorKind::Conflict
            }
            AuthError::InvalidCredentials
            | AuthError::InactiveAccount
            | AuthError::InvalidRefreshToken
            | AuthError::InvalidAccessToken => AuthErrorKind::Unauthorized,
            AuthError::AccountDisabled
            | AuthError::InsufficientPrivileges
            | AuthError::RoleRequired(_) => AuthErrorKind::Forbidden,
            AuthError::Token(_) | AuthError::User(_) => AuthErrorKind::Internal,
        }
    }
}
