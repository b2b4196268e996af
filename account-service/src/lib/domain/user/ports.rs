use async_trait::async_trait;

use crate::domain::user::models::AdminUpdateUserCommand;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserPage;
use crate::user::errors::UserError;
use crate::user::models::EmailAddress;
use crate::user::models::Username;

/// Port for user management operations (profile and administration).
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// List users, newest first.
    ///
    /// # Arguments
    /// * `request` - Validated page coordinates
    ///
    /// # Returns
    /// Requested page with total count and page count
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self, request: PageRequest) -> Result<UserPage, UserError>;

    /// Apply a partial update to the acting user's own profile.
    ///
    /// # Arguments
    /// * `current` - Authenticated user
    /// * `command` - Optional email, username, full name, and password
    ///
    /// # Returns
    /// Updated user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email belongs to another user
    /// * `UsernameAlreadyExists` - Username belongs to another user
    /// * `DatabaseError` - Database operation failed
    async fn update_profile(
        &self,
        current: &User,
        command: UpdateProfileCommand,
    ) -> Result<User, UserError>;

    /// Change the acting user's password after re-checking the current one.
    ///
    /// # Errors
    /// * `IncorrectPassword` - Current password does not match
    /// * `PasswordUnchanged` - New password equals the current one
    /// * `DatabaseError` - Database operation failed
    async fn change_password(
        &self,
        current: &User,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError>;

    /// Update any user (superuser operation).
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_user(
        &self,
        id: &UserId,
        command: AdminUpdateUserCommand,
    ) -> Result<User, UserError>;

    /// Delete a user (superuser operation).
    ///
    /// # Arguments
    /// * `acting` - Superuser performing the deletion
    /// * `id` - User ID to delete
    ///
    /// # Returns
    /// The deleted user
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `CannotDeleteSelf` - `id` is the acting user's id
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, acting: &User, id: &UserId) -> Result<User, UserError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Arguments
    /// * `user` - Fields of the user to create
    ///
    /// # Returns
    /// Created user entity with id and timestamps assigned
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: NewUser) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve user whose email or username equals `identifier`.
    ///
    /// # Arguments
    /// * `identifier` - Raw login identifier (not validated)
    ///
    /// # Returns
    /// Optional user entity (None if neither matches)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email_or_username(&self, identifier: &str) -> Result<Option<User>, UserError>;

    /// Retrieve a slice of users ordered newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserError>;

    /// Count all users.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn count(&self) -> Result<i64, UserError>;

    /// Update existing user in storage and refresh `updated_at`.
    ///
    /// # Returns
    /// Updated user entity as stored
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}
