// src/seed.rs

use crate::{
    config::Config,
    db::Store,
    error::AppError,
    models::user::{NewUser, Role},
    utils::hash::hash_password,
};

/// Creates the configured admin account unless that username already exists.
///
/// Does nothing when `ADMIN_USERNAME` or `ADMIN_PASSWORD` is unset. Returns
/// whether a user was created.
pub async fn seed_admin_user(store: &dyn Store, config: &Config) -> Result<bool, AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(false);
    };

    if store.find_credentials(username).await?.is_some() {
        return Ok(false);
    }

    tracing::info!("Seeding admin user: {}", username);

    let email = config
        .admin_email
        .clone()
        .unwrap_or_else(|| format!("{}@localhost", username));

    store
        .create_user(NewUser {
            username: username.clone(),
            email,
            role: Role::Admin,
            password_hash: hash_password(password)?,
        })
        .await?;

    tracing::info!("Admin user created successfully.");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn config(username: Option<&str>, password: Option<&str>) -> Config {
        Config {
            database_url: "memory:".to_string(),
            jwt_secret: "secret".to_string(),
            jwt_expiration: 60,
            rust_log: "error".to_string(),
            admin_username: username.map(str::to_string),
            admin_password: password.map(str::to_string),
            admin_email: None,
        }
    }

    #[tokio::test]
    async fn seeds_admin_once() {
        let store = MemoryStore::new();
        let config = config(Some("root"), Some("changeme"));

        assert!(seed_admin_user(&store, &config).await.unwrap());
        assert!(!seed_admin_user(&store, &config).await.unwrap());

        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
        assert_eq!(users[0].email, "root@localhost");
    }

    #[tokio::test]
    async fn skips_without_password() {
        let store = MemoryStore::new();
        assert!(!seed_admin_user(&store, &config(Some("root"), None)).await.unwrap());
        assert!(store.list_users().await.unwrap().is_empty());
    }
}
