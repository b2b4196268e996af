use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::AdminUpdateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::PasswordPolicy;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// HTTP request body for an administrative user update (raw JSON)
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<String>,
}

impl UpdateUserRequest {
    fn try_into_command(self, policy: &PasswordPolicy) -> Result<AdminUpdateUserCommand, UserError> {
        let email = self.email.map(EmailAddress::new).transpose()?;
        let username = self.username.map(Username::new_unreserved).transpose()?;
        let full_name = self.full_name.map(FullName::new).transpose()?;
        let role = self.role.map(|r| r.parse::<Role>()).transpose()?;
        if let Some(password) = &self.password {
            policy.validate(password)?;
        }

        Ok(AdminUpdateUserCommand {
            email,
            username,
            full_name,
            password: self.password,
            is_active: self.is_active,
            role,
        })
    }
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let user_id = UserId::from_string(&id).map_err(UserError::from)?;
    let command = req.try_into_command(&state.password_policy)?;

    state
        .user_service
        .update_user(&user_id, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
