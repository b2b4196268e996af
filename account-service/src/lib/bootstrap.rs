use std::sync::Arc;

use auth::Authenticator;
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::domain::auth::hashing;
use crate::user::errors::UserError;
use crate::user::models::EmailAddress;
use crate::user::models::NewUser;
use crate::user::models::Role;
use crate::user::models::User;
use crate::user::models::Username;
use crate::user::ports::UserRepository;

/// Create the initial superuser unless an account with its email exists.
///
/// Without a configured password one is generated and logged once. Config
/// validation guarantees a configured password in staging and production.
///
/// # Returns
/// The created superuser, or None when it already existed
///
/// # Errors
/// * `InvalidEmail` / `InvalidUsername` - Admin identity is malformed
/// * `DatabaseError` - Database operation failed
pub async fn seed_initial_admin<UR>(
    repository: &UR,
    authenticator: &Arc<Authenticator>,
    admin: &AdminConfig,
) -> Result<Option<User>, UserError>
where
    UR: UserRepository,
{
    let email = EmailAddress::new(admin.email.clone())?;

    if repository.find_by_email(&email).await?.is_some() {
        tracing::info!(email = %email, "Initial superuser already present");
        return Ok(None);
    }

    let username = Username::new(admin.username.clone())?;

    let password = match &admin.password {
        Some(password) => password.clone(),
        None => {
            let generated = generate_password();
            tracing::warn!(
                username = %username,
                password = %generated,
                "Generated initial superuser password, set ADMIN__PASSWORD to choose one"
            );
            generated
        }
    };

    let password_hash = hashing::hash_password(authenticator, password).await?;

    let user = repository
        .create(NewUser {
            email,
            username,
            full_name: None,
            password_hash,
            is_active: true,
            is_superuser: true,
            role: Role::Admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Initial superuser created");
    Ok(Some(user))
}

/// 64 hex characters from two random UUIDs.
fn generate_password() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
