// src/db/postgres.rs

//! PostgreSQL implementation of [`Store`].

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};

use super::Store;
use crate::{
    error::AppError,
    models::{
        ad::{Ad, AdType, NewAd},
        comment::{Comment, NewComment},
        user::{NewUser, Role, User},
    },
};

const MAX_CONNECTIONS: u32 = 5;
const CONNECT_RETRIES: u32 = 5;

const USER_COLUMNS: &str = "id, username, email, role, created_at";
const AD_COLUMNS: &str = "id, title, description, ad_type, owner_id, group_id, created_at";
const COMMENT_COLUMNS: &str = "id, text, user_id, ad_id, created_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to Postgres, retrying while the server comes up.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let mut retry_count = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .acquire_timeout(Duration::from_secs(3))
                .connect(database_url)
                .await
            {
                Ok(pool) => {
                    tracing::info!("Database connected...");
                    return Ok(Self::new(pool));
                }
                Err(e) => {
                    retry_count += 1;
                    if retry_count > CONNECT_RETRIES {
                        tracing::error!(
                            "Failed to connect to database after {} retries: {}",
                            CONNECT_RETRIES,
                            e
                        );
                        return Err(e);
                    }
                    tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn decode_err(msg: String) -> sqlx::Error {
    sqlx::Error::Decode(msg.into())
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        role: row.try_get::<String, _>("role")?.parse::<Role>().map_err(decode_err)?,
        created_at: row.try_get("created_at")?,
    })
}

fn ad_from_row(row: &PgRow) -> Result<Ad, sqlx::Error> {
    Ok(Ad {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        ad_type: row.try_get::<String, _>("ad_type")?.parse::<AdType>().map_err(decode_err)?,
        owner_id: row.try_get("owner_id")?,
        group_id: row.try_get("group_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        user_id: row.try_get("user_id")?,
        ad_id: row.try_get("ad_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn collect<T>(
    rows: Vec<PgRow>,
    map: fn(&PgRow) -> Result<T, sqlx::Error>,
) -> Result<Vec<T>, AppError> {
    rows.iter()
        .map(|row| map(row).map_err(AppError::from))
        .collect()
}

#[async_trait]
impl Store for PgStore {
    /// Inserts the user and its credential row atomically.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            "INSERT INTO users (username, email, role) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.role.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let created = user_from_row(&row)?;

        sqlx::query("INSERT INTO user_credentials (user_id, password_hash) VALUES ($1, $2)")
            .bind(created.id)
            .bind(&user.password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        collect(rows, user_from_row)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT u.id, u.username, u.email, u.role, u.created_at, c.password_hash
            FROM users u
            JOIN user_credentials c ON c.user_id = u.id
            WHERE u.username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let user = user_from_row(&row)?;
                let hash: String = row.try_get("password_hash")?;
                Ok(Some((user, hash)))
            }
            None => Ok(None),
        }
    }

    async fn set_role(&self, id: i64, role: Role) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_ad(&self, ad: NewAd) -> Result<Ad, AppError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO ads (title, description, ad_type, owner_id, group_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            AD_COLUMNS
        ))
        .bind(&ad.title)
        .bind(&ad.description)
        .bind(ad.ad_type.as_str())
        .bind(ad.owner_id)
        .bind(ad.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create ad: {:?}", e);
            AppError::from(e)
        })?;
        Ok(ad_from_row(&row)?)
    }

    async fn list_ads(&self) -> Result<Vec<Ad>, AppError> {
        let rows = sqlx::query(&format!("SELECT {} FROM ads ORDER BY id", AD_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        collect(rows, ad_from_row)
    }

    async fn get_ad(&self, id: i64) -> Result<Option<Ad>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM ads WHERE id = $1", AD_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(ad_from_row).transpose()?)
    }

    async fn delete_ad(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_owned_ad(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM ads WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_ads_in_group(&self, group_id: i64) -> Result<Vec<Ad>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM ads WHERE group_id = $1 ORDER BY id",
            AD_COLUMNS
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, ad_from_row)
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let row = sqlx::query(&format!(
            "INSERT INTO comments (text, user_id, ad_id) VALUES ($1, $2, $3) RETURNING {}",
            COMMENT_COLUMNS
        ))
        .bind(&comment.text)
        .bind(comment.user_id)
        .bind(comment.ad_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {:?}", e);
            AppError::from(e)
        })?;
        Ok(comment_from_row(&row)?)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(comment_from_row).transpose()?)
    }

    async fn list_comments(&self, ad_id: i64) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM comments WHERE ad_id = $1 ORDER BY id",
            COMMENT_COLUMNS
        ))
        .bind(ad_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, comment_from_row)
    }

    async fn list_comments_in_group(&self, group_id: i64) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.text, c.user_id, c.ad_id, c.created_at
            FROM comments c
            JOIN ads a ON a.id = c.ad_id
            WHERE a.group_id = $1
            ORDER BY c.id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, comment_from_row)
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_comments_in_group(&self, group_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM comments WHERE ad_id IN (SELECT id FROM ads WHERE group_id = $1)",
        )
        .bind(group_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete group comments: {:?}", e);
            AppError::from(e)
        })?;
        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed.");
    }
}
