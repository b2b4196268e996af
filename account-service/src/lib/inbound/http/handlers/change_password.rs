use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::PasswordPolicy;
use crate::inbound::http::middleware::CurrentUser;
use crate::inbound::http::router::AppState;

pub async fn change_password(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<ApiSuccess<MessageData>, ApiError> {
    let command = body.try_into_command(&state.password_policy)?;

    state
        .user_service
        .change_password(&user, command)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, MessageData::new("Password updated successfully")))
}

#[derive(Clone, Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
    confirm_password: String,
}

impl ChangePasswordRequest {
    fn try_into_command(self, policy: &PasswordPolicy) -> Result<ChangePasswordCommand, ApiError> {
        if self.current_password.is_empty() {
            return Err(ApiError::UnprocessableEntity(
                "Current password is required".to_string(),
            ));
        }

        policy
            .validate(&self.new_password)
            .map_err(|e| ApiError::UnprocessableEntity(format!("Invalid password: {}", e)))?;

        if self.new_password != self.confirm_password {
            return Err(ApiError::UnprocessableEntity(
                "New password and confirmation do not match".to_string(),
            ));
        }

        Ok(ChangePasswordCommand {
            current_password: self.current_password,
            new_password: self.new_password,
        })
    }
}
