use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::FullName;
use crate::domain::user::models::PasswordPolicy;
use crate::domain::user::models::Username;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let command = body.try_into_command(&state.password_policy)?;

    state
        .auth_service
        .register(command)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for self-registration (raw JSON)
#[derive(Clone, Deserialize)]
pub struct RegisterRequest {
    email: String,
    username: String,
    password: String,
    full_name: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self, policy: &PasswordPolicy) -> Result<RegisterCommand, UserError> {
        let email = EmailAddress::new(self.email)?;
        let username = Username::new_unreserved(self.username)?;
        let full_name = self.full_name.map(FullName::new).transpose()?;
        policy.validate(&self.password)?;

        Ok(RegisterCommand {
            email,
            username,
            password: self.password,
            full_name,
        })
    }
}
