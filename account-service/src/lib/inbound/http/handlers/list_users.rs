use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::PageRequest;
use crate::domain::user::models::UserPage;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> Result<ApiSuccess<UserPageData>, ApiError> {
    let request = params.try_into_page_request()?;

    state
        .user_service
        .list_users(request)
        .await
        .map_err(ApiError::from)
        .map(|ref page| ApiSuccess::new(StatusCode::OK, page.into()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersParams {
    page: Option<u32>,
    page_size: Option<u32>,
}

impl ListUsersParams {
    fn try_into_page_request(self) -> Result<PageRequest, UserError> {
        let defaults = PageRequest::default();
        Ok(PageRequest::new(
            self.page.unwrap_or(defaults.page()),
            self.page_size.unwrap_or(defaults.page_size()),
        )?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPageData {
    pub users: Vec<UserData>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub pages: i64,
}

impl From<&UserPage> for UserPageData {
    fn from(page: &UserPage) -> Self {
        Self {
            users: page.users.iter().map(UserData::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            pages: page.pages,
        }
    }
}
