use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::PasswordPolicy;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn update_current_user(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let command = body.try_into_command(&state.password_policy)?;

    state
        .user_service
        .update_profile(&user, command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// HTTP request body for a partial profile update (raw JSON)
#[derive(Clone, Deserialize)]
pub struct UpdateProfileRequest {
    email: Option<String>,
    username: Option<String>,
    full_name: Option<String>,
    password: Option<String>,
}

impl UpdateProfileRequest {
    fn try_into_command(self, policy: &PasswordPolicy) -> Result<UpdateProfileCommand, UserError> {
        let email = self.email.map(EmailAddress::new).transpose()?;
        let username = self.username.map(Username::new_unreserved).transpose()?;
        let full_name = self.full_name.map(FullName::new).transpose()?;
        if let Some(password) = &self.password {
            policy.validate(password)?;
        }

        Ok(UpdateProfileCommand {
            email,
            username,
            full_name,
            password: self.password,
        })
    }
}
