use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;

use crate::domain::auth::hashing;
use crate::domain::user::models::AdminUpdateUserCommand;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserPage;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user management.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hasher used for password changes
    ///
    /// # Returns
    /// Configured user service instance
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    async fn find_existing(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.find_existing(id).await
    }

    async fn list_users(&self, request: PageRequest) -> Result<UserPage, UserError> {
        let total = self.repository.count().await?;
        let users = self
            .repository
            .list(request.offset(), request.limit())
            .await?;

        Ok(UserPage::new(users, total, request))
    }

    async fn update_profile(
        &self,
        current: &User,
        command: UpdateProfileCommand,
    ) -> Result<User, UserError> {
        let mut user = current.clone();

        if let Some(new_email) = command.email {
            let taken = self.repository.find_by_email(&new_email).await?;
            if taken.is_some_and(|other| other.id != current.id) {
                return Err(UserError::EmailAlreadyExists(new_email.to_string()));
            }
            user.email = new_email;
        }

        if let Some(new_username) = command.username {
            let taken = self.repository.find_by_username(&new_username).await?;
            if taken.is_some_and(|other| other.id != current.id) {
                return Err(UserError::UsernameAlreadyExists(new_username.to_string()));
            }
            user.username = new_username;
        }

        if let Some(new_full_name) = command.full_name {
            user.full_name = Some(new_full_name);
        }

        if let Some(new_password) = command.password {
            user.password_hash = hashing::hash_password(&self.authenticator, new_password).await?;
        }

        let updated_user = self.repository.update(user).await?;
        tracing::info!(user_id = %updated_user.id, "Profile updated");

        Ok(updated_user)
    }

    async fn change_password(
        &self,
        current: &User,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError> {
        let matches = hashing::verify_password(
            &self.authenticator,
            command.current_password.clone(),
            current.password_hash.clone(),
        )
        .await;

        if !matches {
            tracing::warn!(user_id = %current.id, "Password change rejected: incorrect current password");
            return Err(UserError::IncorrectPassword);
        }

        if command.current_password == command.new_password {
            return Err(UserError::PasswordUnchanged);
        }

        let mut user = current.clone();
        user.password_hash =
            hashing::hash_password(&self.authenticator, command.new_password).await?;
        self.repository.update(user).await?;

        tracing::info!(user_id = %current.id, "Password changed");
        Ok(())
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: AdminUpdateUserCommand,
    ) -> Result<User, UserError> {
        let mut user = self.find_existing(id).await?;

        if let Some(new_email) = command.email {
            user.email = new_email;
        }

        if let Some(new_username) = command.username {
            user.username = new_username;
        }

        if let Some(new_full_name) = command.full_name {
            user.full_name = Some(new_full_name);
        }

        if let Some(new_password) = command.password {
            user.password_hash = hashing::hash_password(&self.authenticator, new_password).await?;
        }

        if let Some(is_active) = command.is_active {
            user.is_active = is_active;
        }

        if let Some(role) = command.role {
            user.role = role;
        }

        let updated_user = self.repository.update(user).await?;
        tracing::info!(
            user_id = %updated_user.id,
            is_active = updated_user.is_active,
            role = %updated_user.role,
            "User updated by administrator"
        );

        Ok(updated_user)
    }

    async fn delete_user(&self, acting: &User, id: &UserId) -> Result<User, UserError> {
        let user = self.find_existing(id).await?;

        if user.id == acting.id {
            return Err(UserError::CannotDeleteSelf);
        }

        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, deleted_by = %acting.id, "User deleted");

        Ok(user)
    }
}
