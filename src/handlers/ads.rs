// src/handlers/ads.rs

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
    models::ad::{CreateAdRequest, NewAd},
    utils::jwt::CurrentUser,
};

/// Create a new ad owned by the acting user.
pub async fn create_ad(
    State(store): State<DynStore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateAdRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let ad = store
        .create_ad(NewAd {
            title: payload.title,
            description: payload.description,
            ad_type: payload.ad_type,
            owner_id: user.id,
            group_id: payload.group_id,
        })
        .await?;

    tracing::info!(ad_id = ad.id, ad_type = %ad.ad_type, owner = user.id, "Ad created");

    Ok(Json(json!({
        "message": "Ad created successfully",
        "ad_id": ad.id
    })))
}

/// List all ads.
pub async fn list_ads(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    let ads = store.list_ads().await?;

    Ok(Json(json!({ "ads": ads })))
}

/// Get a single ad by ID.
pub async fn get_ad(
    State(store): State<DynStore>,
    Path(ad_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let ad = store
        .get_ad(ad_id)
        .await?
        .ok_or(AppError::NotFound("Ad not found".to_string()))?;

    Ok(Json(json!({ "ad": ad })))
}

/// Delete an ad by ID.
/// Requires: Login. Any acting user may delete; only a missing ad is an error.
pub async fn delete_ad(
    State(store): State<DynStore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(ad_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_ad(ad_id).await? {
        return Err(AppError::NotFound("Ad not found".to_string()));
    }

    tracing::info!(ad_id, by = user.id, "Ad deleted");

    Ok(Json(json!({ "message": "Ad deleted successfully" })))
}

/// Delete an ad the acting user owns.
/// Someone else's ad looks the same as a missing one.
pub async fn delete_own_ad(
    State(store): State<DynStore>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(ad_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_owned_ad(ad_id, user.id).await? {
        return Err(AppError::NotFound("Ad not found".to_string()));
    }

    Ok(Json(json!({ "message": "Ad deleted successfully" })))
}
