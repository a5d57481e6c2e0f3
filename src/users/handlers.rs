use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use crate::{
    state::AppState,
    users::{
        dto::{
            CreateUserRequest, DeleteUserRequest, DeletedUserResponse, MessageResponse,
            UpdateUserRequest, UserSummary,
        },
        errors::AccountError,
        services::AccountManager,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users",
        get(list_users)
            .post(create_user)
            .patch(update_user)
            .delete(delete_user),
    )
}

/// Unwrap a JSON body, reporting malformed input as `InvalidInput`
/// instead of axum's default rejection.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AccountError> {
    payload.map(|Json(body)| body).map_err(|e| {
        warn!(error = %e, "malformed request body");
        AccountError::invalid(e.body_text())
    })
}

#[instrument(skip(accounts))]
pub async fn list_users(
    State(accounts): State<AccountManager>,
) -> Result<Json<Vec<UserSummary>>, AccountError> {
    let users = accounts.list_accounts().await?;
    Ok(Json(users))
}

#[instrument(skip(accounts, payload))]
pub async fn create_user(
    State(accounts): State<AccountManager>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AccountError> {
    let message = accounts.create_account(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse { message })))
}

#[instrument(skip(accounts, payload))]
pub async fn update_user(
    State(accounts): State<AccountManager>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AccountError> {
    let message = accounts.update_account(json_body(payload)?).await?;
    Ok(Json(MessageResponse { message }))
}

#[instrument(skip(accounts, payload))]
pub async fn delete_user(
    State(accounts): State<AccountManager>,
    payload: Result<Json<DeleteUserRequest>, JsonRejection>,
) -> Result<Json<DeletedUserResponse>, AccountError> {
    let deleted = accounts.delete_account(json_body(payload)?).await?;
    Ok(Json(deleted.into()))
}
