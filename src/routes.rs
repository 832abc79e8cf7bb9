// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{ads, auth, comments, users},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public routes: registration, login, and all read endpoints.
/// * Member routes: require a valid bearer token (acting user).
/// * Admin routes: bearer token whose user currently has the admin role.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/users", get(users::list_users))
        .route("/ads", get(ads::list_ads))
        .route("/ad/{ad_id}", get(ads::get_ad))
        .route("/get_comments/{ad_id}", get(comments::list_comments))
        .route(
            "/get_comments_in_group/{ad_group_id}",
            get(comments::list_group_comments),
        );

    let member_routes = Router::new()
        .route("/create_ad", post(ads::create_ad))
        .route("/add_comment/{ad_id}", post(comments::add_comment))
        .route("/delete_comment/{comment_id}", delete(comments::delete_comment))
        .route("/delete_ad/{ad_id}", delete(ads::delete_ad))
        .route("/delete_own_ad/{ad_id}", delete(ads::delete_own_ad))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/assign_admin/{user_id}", put(users::assign_admin))
        .route(
            "/delete_comments/{ad_group_id}",
            delete(comments::delete_group_comments),
        )
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(member_routes)
        .merge(admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
