// src/db/schema.rs

use sqlx::PgPool;

/// DDL applied at startup. Each entry runs as its own statement.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_credentials (
        user_id BIGINT PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        password_hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ads (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        ad_type TEXT NOT NULL CHECK (ad_type IN ('sale', 'purchase', 'service')),
        owner_id BIGINT NOT NULL REFERENCES users(id),
        group_id BIGINT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ads_group_id_idx ON ads (group_id)",
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id BIGSERIAL PRIMARY KEY,
        text TEXT NOT NULL,
        user_id BIGINT NOT NULL REFERENCES users(id),
        ad_id BIGINT NOT NULL REFERENCES ads(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS comments_ad_id_idx ON comments (ad_id)",
];

/// Creates all tables and indexes if they do not exist yet.
pub async fn create_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(*statement).execute(pool).await?;
    }

    tracing::info!("Database schema ready.");
    Ok(())
}
