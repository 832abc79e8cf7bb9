// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    db::DynStore,
    error::AppError,
    models::user::{LoginRequest, NewUser, RegisterRequest},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it. A taken username or
/// email is a storage error and surfaces as a 500.
pub async fn register(
    State(store): State<DynStore>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let password_hash = hash_password(&payload.password)?;

    let user = store
        .create_user(NewUser {
            username: payload.username,
            email: payload.email,
            role: payload.role,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    Ok(Json(json!({
        "message": "User registered successfully",
        "user_id": user.id
    })))
}

/// Authenticates a user and returns a JWT token.
///
/// Unknown usernames and wrong passwords get the same 401.
pub async fn login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::AuthError("Invalid credentials".to_string());

    payload.validate().map_err(|_| invalid())?;

    let (user, password_hash) = store
        .find_credentials(&payload.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &password_hash)? {
        return Err(invalid());
    }

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(json!({
        "message": "Login successful",
        "user_id": user.id,
        "token": token,
        "type": "Bearer"
    })))
}
