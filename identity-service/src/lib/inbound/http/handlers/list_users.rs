use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

const DEFAULT_LIMIT: i64 = 100;

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> Result<ApiSuccess<Vec<UserData>>, ApiError> {
    let skip = params.skip.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(0, DEFAULT_LIMIT);

    state
        .user_service
        .list_users(skip, limit)
        .await
        .map_err(ApiError::from)
        .map(|users| {
            ApiSuccess::new(StatusCode::OK, users.iter().map(UserData::from).collect())
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListUsersParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}
