// tests/pg_store_tests.rs
//
// Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use classifieds::{
    db::{PgStore, Store, schema},
    models::{
        ad::{AdType, NewAd},
        comment::NewComment,
        user::{NewUser, Role},
    },
};

async fn store() -> PgStore {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let store = PgStore::connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");
    schema::create_schema(store.pool())
        .await
        .expect("Failed to create schema");
    store
}

fn new_user(prefix: &str) -> NewUser {
    let username = format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8]);
    NewUser {
        email: format!("{}@example.com", username),
        username,
        role: Role::User,
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn schema_creation_is_idempotent() {
    let store = store().await;
    schema::create_schema(store.pool())
        .await
        .expect("second run should be a no-op");
}

#[tokio::test]
#[ignore = "requires database"]
async fn user_and_credentials_round_trip() {
    let store = store().await;
    let new = new_user("pg");
    let hash = new.password_hash.clone();

    let user = store.create_user(new).await.unwrap();
    let (found, stored_hash) = store
        .find_credentials(&user.username)
        .await
        .unwrap()
        .expect("credentials missing");

    assert_eq!(found.id, user.id);
    assert_eq!(stored_hash, hash);

    assert!(store.set_role(user.id, Role::Admin).await.unwrap());
    assert_eq!(store.get_user(user.id).await.unwrap().unwrap().role, Role::Admin);
}

#[tokio::test]
#[ignore = "requires database"]
async fn duplicate_username_fails() {
    let store = store().await;
    let first = new_user("pgdup");
    let mut second = new_user("pgdup");
    second.username = first.username.clone();

    store.create_user(first).await.unwrap();
    assert!(store.create_user(second).await.is_err());
}

#[tokio::test]
#[ignore = "requires database"]
async fn ad_comments_and_groups() {
    let store = store().await;
    let user = store.create_user(new_user("pgad")).await.unwrap();
    // Random group so reruns against the same database stay isolated
    let group_id = i64::from(uuid::Uuid::new_v4().as_fields().0);

    let ad = store
        .create_ad(NewAd {
            title: "Lawn mower".to_string(),
            description: "Petrol".to_string(),
            ad_type: AdType::Service,
            owner_id: user.id,
            group_id: Some(group_id),
        })
        .await
        .unwrap();
    assert_eq!(store.get_ad(ad.id).await.unwrap().unwrap().ad_type, AdType::Service);

    let comment = store
        .create_comment(NewComment {
            text: "How old is it?".to_string(),
            user_id: user.id,
            ad_id: ad.id,
        })
        .await
        .unwrap();

    assert_eq!(store.list_comments_in_group(group_id).await.unwrap().len(), 1);
    assert_eq!(store.delete_comments_in_group(group_id).await.unwrap(), 1);
    assert!(store.get_comment(comment.id).await.unwrap().is_none());

    assert!(!store.delete_owned_ad(ad.id, user.id + 1_000_000).await.unwrap());
    assert!(store.delete_owned_ad(ad.id, user.id).await.unwrap());
    assert!(!store.delete_ad(ad.id).await.unwrap());
}
