// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{db::DynStore, error::AppError, models::user::Role};

/// Lists all users in the system.
pub async fn list_users(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let users = store.list_users().await?;

    Ok(Json(json!({ "users": users })))
}

/// Promotes a user to admin.
/// Admin only.
pub async fn assign_admin(
    State(store): State<DynStore>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.set_role(user_id, Role::Admin).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id, "User promoted to admin");

    Ok(Json(json!({ "message": "User assigned as admin successfully" })))
}
