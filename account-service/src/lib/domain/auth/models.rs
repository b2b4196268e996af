use std::fmt;

use crate::domain::auth::errors::AuthError;
use crate::user::models::EmailAddress;
use crate::user::models::FullName;
use crate::user::models::Role;
use crate::user::models::User;
use crate::user::models::Username;

/// Validated self-registration request.
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub username: Username,
    pub password: String,
    pub full_name: Option<FullName>,
}

impl fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("full_name", &self.full_name)
            .finish()
    }
}

/// Login identifier (username or email) with a plaintext password.
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Privilege an endpoint requires from the acting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Any active account
    ActiveUser,
    /// Active account with the superuser flag
    Superuser,
    /// Active account holding one of the roles; superusers always pass
    AnyRole(Vec<Role>),
}

impl Access {
    /// Check an already resolved user against this requirement.
    ///
    /// # Errors
    /// * `AccountDisabled` - User is inactive
    /// * `InsufficientPrivileges` - Superuser required
    /// * `RoleRequired` - User holds none of the listed roles
    pub fn check(&self, user: &User) -> Result<(), AuthError> {
        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        match self {
            Access::ActiveUser => Ok(()),
            Access::Superuser if user.is_superuser => Ok(()),
            Access::Superuser => Err(AuthError::InsufficientPrivileges),
            Access::AnyRole(_) if user.is_superuser => Ok(()),
            Access::AnyRole(roles) if roles.contains(&user.role) => Ok(()),
            Access::AnyRole(roles) => Err(AuthError::RoleRequired(roles.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::user::models::UserId;

    fn user(is_active: bool, is_superuser: bool, role: Role) -> User {
        User {
            id: UserId(1),
            email: EmailAddress::new("a@example.com".to_string()).unwrap(),
            username: Username::new("alice".to_string()).unwrap(),
            full_name: None,
            password_hash: String::new(),
            is_active,
            is_superuser,
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_inactive_user_is_rejected_first() {
        let inactive_superuser = user(false, true, Role::Admin);
        assert!(matches!(
            Access::Superuser.check(&inactive_superuser),
            Err(AuthError::AccountDisabled)
        ));
        assert!(matches!(
            Access::ActiveUser.check(&inactive_superuser),
            Err(AuthError::AccountDisabled)
        ));
    }

    #[test]
    fn test_superuser_requirement() {
        assert!(Access::Superuser.check(&user(true, true, Role::User)).is_ok());
        assert!(matches!(
            Access::Superuser.check(&user(true, false, Role::Admin)),
            Err(AuthError::InsufficientPrivileges)
        ));
    }

    #[test]
    fn test_role_requirement() {
        let moderators = Access::AnyRole(vec![Role::Admin, Role::Moderator]);

        assert!(moderators.check(&user(true, false, Role::Moderator)).is_ok());
        assert!(moderators.check(&user(true, true, Role::User)).is_ok());
        assert!(matches!(
            moderators.check(&user(true, false, Role::Staff)),
            Err(AuthError::RoleRequired(roles)) if roles == vec![Role::Admin, Role::Moderator]
        ));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials {
            identifier: "alice".to_string(),
            password: "S3cret!pass".to_string(),
        };
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("S3cret"));
    }

    #[test]
    fn test_register_command_debug_hides_password() {
        let command = RegisterCommand {
            email: EmailAddress::new("alice@example.com".to_string()).unwrap(),
            username: Username::new("alice".to_string()).unwrap(),
            password: "S3cret!pass".to_string(),
            full_name: None,
        };
        let rendered = format!("{:?}", command);
        assert!(rendered.contains("alice@example.com"));
        assert!(!rendered.contains("S3cret"));
    }
}
