// src/db/mod.rs

//! Storage port and its implementations.
//!
//! Handlers only see `Arc<dyn Store>`; the concrete backend is chosen once at
//! startup from the connection string.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        ad::{Ad, NewAd},
        comment::{Comment, NewComment},
        user::{NewUser, Role, User},
    },
};

pub mod memory;
pub mod postgres;
pub mod schema;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Connection strings with this prefix select the in-process store.
pub const MEMORY_URL_PREFIX: &str = "memory:";

/// Shared handle passed to every handler.
pub type DynStore = Arc<dyn Store>;

/// Data persistence contract for users, ads, and comments.
///
/// Every list is ordered by id. Deletes report whether a row was removed.
#[async_trait]
pub trait Store: Send + Sync {
    // User Operations
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;
    /// Looks up a user by username along with the stored password hash.
    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>, AppError>;
    async fn set_role(&self, id: i64, role: Role) -> Result<bool, AppError>;

    // Ad Operations
    async fn create_ad(&self, ad: NewAd) -> Result<Ad, AppError>;
    async fn list_ads(&self) -> Result<Vec<Ad>, AppError>;
    async fn get_ad(&self, id: i64) -> Result<Option<Ad>, AppError>;
    /// Removes the ad and its comments.
    async fn delete_ad(&self, id: i64) -> Result<bool, AppError>;
    /// Removes the ad only when `owner_id` owns it.
    async fn delete_owned_ad(&self, id: i64, owner_id: i64) -> Result<bool, AppError>;
    async fn list_ads_in_group(&self, group_id: i64) -> Result<Vec<Ad>, AppError>;

    // Comment Operations
    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, AppError>;
    async fn list_comments(&self, ad_id: i64) -> Result<Vec<Comment>, AppError>;
    async fn list_comments_in_group(&self, group_id: i64) -> Result<Vec<Comment>, AppError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, AppError>;
    /// Returns the number of comments removed.
    async fn delete_comments_in_group(&self, group_id: i64) -> Result<u64, AppError>;

    /// Releases any held connections. Called once on shutdown.
    async fn close(&self);
}

/// Opens the store named by `database_url` and makes sure the schema exists.
pub async fn connect(database_url: &str) -> Result<DynStore, AppError> {
    if database_url.starts_with(MEMORY_URL_PREFIX) {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = PgStore::connect(database_url).await?;
    schema::create_schema(store.pool()).await?;
    Ok(Arc::new(store))
}
