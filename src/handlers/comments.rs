// src/handlers/comments.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    db::DynStore,
    error::AppError,
    models::comment::{CreateCommentRequest, NewComment},
    utils::jwt::CurrentUser,
};

/// Add a comment to an existing ad.
pub async fn add_comment(
    State(store): State<DynStore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(ad_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if store.get_ad(ad_id).await?.is_none() {
        return Err(AppError::NotFound("Ad not found".to_string()));
    }

    let comment = store
        .create_comment(NewComment {
            text: payload.text,
            user_id: user.id,
            ad_id,
        })
        .await?;

    Ok(Json(json!({
        "message": "Comment added successfully",
        "comment_id": comment.id
    })))
}

/// List all comments for an ad.
pub async fn list_comments(
    State(store): State<DynStore>,
    Path(ad_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if store.get_ad(ad_id).await?.is_none() {
        return Err(AppError::NotFound("Ad not found".to_string()));
    }

    let comments = store.list_comments(ad_id).await?;

    Ok(Json(json!({ "comments": comments })))
}

/// Delete a comment by ID.
/// Requires: Login. No authorship check; only a missing comment is an error.
pub async fn delete_comment(
    State(store): State<DynStore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(comment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_comment(comment_id).await? {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    tracing::info!(comment_id, by = user.id, "Comment deleted");

    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}

/// List comments across every ad in a group.
pub async fn list_group_comments(
    State(store): State<DynStore>,
    Path(ad_group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if store.list_ads_in_group(ad_group_id).await?.is_empty() {
        return Err(AppError::NotFound("Ad group not found".to_string()));
    }

    let comments = store.list_comments_in_group(ad_group_id).await?;

    Ok(Json(json!({ "comments": comments })))
}

/// Delete comments across every ad in a group.
/// Admin only.
pub async fn delete_group_comments(
    State(store): State<DynStore>,
    Extension(CurrentUser(admin)): Extension<CurrentUser>,
    Path(ad_group_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = store.delete_comments_in_group(ad_group_id).await?;

    tracing::info!(ad_group_id, deleted, by = admin.id, "Group comments deleted");

    Ok(Json(json!({
        "message": "Comments deleted successfully",
        "deleted": deleted
    })))
}
