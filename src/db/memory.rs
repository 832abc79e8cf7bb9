// src/db/memory.rs

//! In-process implementation of [`Store`].
//!
//! Enforces the same uniqueness and foreign-key rules as the Postgres schema.
//! Violations surface as internal errors, matching what a constraint failure
//! looks like through `PgStore`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::Store;
use crate::{
    error::AppError,
    models::{
        ad::{Ad, NewAd},
        comment::{Comment, NewComment},
        user::{NewUser, Role, User},
    },
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    credentials: BTreeMap<i64, String>,
    ads: BTreeMap<i64, Ad>,
    comments: BTreeMap<i64, Comment>,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn constraint_violation(constraint: &str) -> AppError {
    AppError::InternalServerError(format!("constraint violation: {}", constraint))
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(constraint_violation("users_username_key"));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(constraint_violation("users_email_key"));
        }

        let id = tables.allocate_id();
        let created = User {
            id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        tables.credentials.insert(id, user.password_hash);
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<(User, String)>, AppError> {
        let tables = self.tables.read().await;
        let found = tables
            .users
            .values()
            .find(|u| u.username == username)
            .and_then(|u| {
                tables
                    .credentials
                    .get(&u.id)
                    .map(|hash| (u.clone(), hash.clone()))
            });
        Ok(found)
    }

    async fn set_role(&self, id: i64, role: Role) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_ad(&self, ad: NewAd) -> Result<Ad, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&ad.owner_id) {
            return Err(constraint_violation("ads_owner_id_fkey"));
        }

        let id = tables.allocate_id();
        let created = Ad {
            id,
            title: ad.title,
            description: ad.description,
            ad_type: ad.ad_type,
            owner_id: ad.owner_id,
            group_id: ad.group_id,
            created_at: Utc::now(),
        };
        tables.ads.insert(id, created.clone());
        Ok(created)
    }

    async fn list_ads(&self) -> Result<Vec<Ad>, AppError> {
        Ok(self.tables.read().await.ads.values().cloned().collect())
    }

    async fn get_ad(&self, id: i64) -> Result<Option<Ad>, AppError> {
        Ok(self.tables.read().await.ads.get(&id).cloned())
    }

    async fn delete_ad(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.ads.remove(&id).is_none() {
            return Ok(false);
        }
        tables.comments.retain(|_, c| c.ad_id != id);
        Ok(true)
    }

    async fn delete_owned_ad(&self, id: i64, owner_id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .ads
            .get(&id)
            .is_some_and(|ad| ad.owner_id == owner_id);
        if !owned {
            return Ok(false);
        }
        tables.ads.remove(&id);
        tables.comments.retain(|_, c| c.ad_id != id);
        Ok(true)
    }

    async fn list_ads_in_group(&self, group_id: i64) -> Result<Vec<Ad>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .ads
            .values()
            .filter(|ad| ad.group_id == Some(group_id))
            .cloned()
            .collect())
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&comment.user_id) {
            return Err(constraint_violation("comments_user_id_fkey"));
        }
        if !tables.ads.contains_key(&comment.ad_id) {
            return Err(constraint_violation("comments_ad_id_fkey"));
        }

        let id = tables.allocate_id();
        let created = Comment {
            id,
            text: comment.text,
            user_id: comment.user_id,
            ad_id: comment.ad_id,
            created_at: Utc::now(),
        };
        tables.comments.insert(id, created.clone());
        Ok(created)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, AppError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn list_comments(&self, ad_id: i64) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.ad_id == ad_id)
            .cloned()
            .collect())
    }

    async fn list_comments_in_group(&self, group_id: i64) -> Result<Vec<Comment>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| {
                tables
                    .ads
                    .get(&c.ad_id)
                    .is_some_and(|ad| ad.group_id == Some(group_id))
            })
            .cloned()
            .collect())
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.comments.remove(&id).is_some())
    }

    async fn delete_comments_in_group(&self, group_id: i64) -> Result<u64, AppError> {
        let mut guard = self.tables.write().await;
        let tables = &mut *guard;
        let before = tables.comments.len();
        let ads = &tables.ads;
        tables.comments.retain(|_, c| {
            !ads.get(&c.ad_id)
                .is_some_and(|ad| ad.group_id == Some(group_id))
        });
        Ok((before - tables.comments.len()) as u64)
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ad::AdType;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            role: Role::User,
            password_hash: "hash".to_string(),
        }
    }

    fn new_ad(owner_id: i64, group_id: Option<i64>) -> NewAd {
        NewAd {
            title: "Bicycle".to_string(),
            description: "Barely used".to_string(),
            ad_type: AdType::Sale,
            owner_id,
            group_id,
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice")).await.unwrap();

        let mut dup = new_user("alice");
        dup.email = "other@example.com".to_string();
        let err = store.create_user(dup).await.unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice")).await.unwrap();

        let mut dup = new_user("bob");
        dup.email = "alice@example.com".to_string();
        assert!(store.create_user(dup).await.is_err());
    }

    #[tokio::test]
    async fn ad_requires_existing_owner() {
        let store = MemoryStore::new();
        assert!(store.create_ad(new_ad(42, None)).await.is_err());
    }

    #[tokio::test]
    async fn deleting_ad_cascades_to_comments() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("alice")).await.unwrap();
        let ad = store.create_ad(new_ad(user.id, None)).await.unwrap();
        let comment = store
            .create_comment(NewComment {
                text: "Still available?".to_string(),
                user_id: user.id,
                ad_id: ad.id,
            })
            .await
            .unwrap();

        assert!(store.delete_ad(ad.id).await.unwrap());
        assert!(store.get_comment(comment.id).await.unwrap().is_none());
        assert!(!store.delete_ad(ad.id).await.unwrap());
    }

    #[tokio::test]
    async fn delete_owned_ad_checks_owner() {
        let store = MemoryStore::new();
        let alice = store.create_user(new_user("alice")).await.unwrap();
        let bob = store.create_user(new_user("bob")).await.unwrap();
        let ad = store.create_ad(new_ad(alice.id, None)).await.unwrap();

        assert!(!store.delete_owned_ad(ad.id, bob.id).await.unwrap());
        assert!(store.get_ad(ad.id).await.unwrap().is_some());
        assert!(store.delete_owned_ad(ad.id, alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn group_operations_only_touch_grouped_ads() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("alice")).await.unwrap();
        let grouped = store.create_ad(new_ad(user.id, Some(7))).await.unwrap();
        let other = store.create_ad(new_ad(user.id, Some(8))).await.unwrap();

        for ad_id in [grouped.id, grouped.id, other.id] {
            store
                .create_comment(NewComment {
                    text: "hi".to_string(),
                    user_id: user.id,
                    ad_id,
                })
                .await
                .unwrap();
        }

        assert_eq!(store.list_ads_in_group(7).await.unwrap().len(), 1);
        assert_eq!(store.list_comments_in_group(7).await.unwrap().len(), 2);
        assert_eq!(store.delete_comments_in_group(7).await.unwrap(), 2);
        assert!(store.list_comments_in_group(7).await.unwrap().is_empty());
        assert_eq!(store.delete_comments_in_group(999).await.unwrap(), 0);
        assert_eq!(store.list_comments(other.id).await.unwrap().len(), 1);
    }
}
