//! User service tests over the in-memory unit of work.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use sea_orm::DbErr;
use tokio::sync::oneshot;
use tokio_test::{assert_err, assert_ok};

use common::AppError;
use domain::User;
use user_service_lib::infra::{InMemoryPersistence, UnitOfWork};
use user_service_lib::repository::{InMemoryUserStore, UserRepository};
use user_service_lib::service::{UserManager, UserService};

fn setup() -> (Arc<InMemoryPersistence>, UserManager<InMemoryPersistence>) {
    let uow = Arc::new(InMemoryPersistence::new());
    let service = UserManager::new(uow.clone());
    (uow, service)
}

#[tokio::test]
async fn test_user_lifecycle() {
    let (_, service) = setup();

    let saved = assert_ok!(service.save_user(User::new("alice", "a@x.com")).await);
    assert_eq!(saved.id, Some(1));

    let found = assert_ok!(service.get_user_by_id(1).await);
    assert_eq!(
        found,
        Some(User {
            id: Some(1),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
        })
    );

    assert_ok!(service.update_user(1, User::new("alice2", "a2@x.com")).await);
    let found = assert_ok!(service.get_user_by_id(1).await).unwrap();
    assert_eq!(found.id, Some(1));
    assert_eq!(found.username, "alice2");
    assert_eq!(found.email, "a2@x.com");

    assert_ok!(service.delete_user(1).await);
    assert_eq!(assert_ok!(service.get_user_by_id(1).await), None);
}

#[tokio::test]
async fn test_unknown_ids_are_silent() {
    let (uow, service) = setup();
    assert_ok!(service.save_user(User::new("alice", "a@x.com")).await);
    let before = assert_ok!(service.get_all_users().await);

    assert_eq!(assert_ok!(service.get_user_by_id(404).await), None);
    assert_eq!(
        assert_ok!(uow.users().update_by_id(404, "x".to_string(), "y".to_string()).await),
        0
    );
    assert_ok!(service.update_user(404, User::new("x", "y")).await);
    assert_ok!(service.delete_user(404).await);

    assert_eq!(assert_ok!(service.get_all_users().await), before);
}

#[tokio::test]
async fn test_get_all_users_matches_stored_set() {
    let (_, service) = setup();

    let alice = assert_ok!(service.save_user(User::new("alice", "a@x.com")).await);
    let bob = assert_ok!(service.save_user(User::new("bob", "b@x.com")).await);
    let carol = assert_ok!(service.save_user(User::new("carol", "c@x.com")).await);
    assert_ok!(service.delete_user(bob.id.unwrap()).await);

    let mut users = assert_ok!(service.get_all_users().await);
    users.sort_by_key(|u| u.id);

    assert_eq!(users, vec![alice, carol]);
}

#[tokio::test]
async fn test_failed_transaction_leaves_store_unchanged() {
    let (uow, service) = setup();
    assert_ok!(service.save_user(User::new("alice", "a@x.com")).await);

    let result = uow
        .transaction(|ctx| {
            Box::pin(async move {
                ctx.users().save(User::new("bob", "b@x.com")).await?;
                ctx.users().delete_by_id(1).await?;
                Err::<(), _>(AppError::from(DbErr::Custom("abort".to_string())))
            })
        })
        .await;

    assert!(matches!(assert_err!(result), AppError::Database(_)));
    let users = assert_ok!(service.get_all_users().await);
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "alice");
}

#[tokio::test]
async fn test_uncommitted_writes_are_invisible_outside() {
    let (uow, _) = setup();
    let outside = uow.users();

    let seen_outside = assert_ok!(
        uow.transaction(|ctx| {
            Box::pin(async move {
                let saved = ctx.users().save(User::new("alice", "a@x.com")).await?;
                outside.get_by_id(saved.id.unwrap_or_default()).await
            })
        })
        .await
    );

    assert_eq!(seen_outside, None);
    assert_eq!(uow.store().len().await, 1);
}

#[tokio::test]
async fn test_direct_write_during_transaction_survives_commit() {
    let (uow, _) = setup();
    let (opened, wait_opened) = oneshot::channel::<()>();
    let (release, wait_release) = oneshot::channel::<()>();

    let in_tx = tokio::spawn({
        let uow = uow.clone();
        async move {
            uow.transaction(move |ctx| {
                Box::pin(async move {
                    let _ = opened.send(());
                    let _ = wait_release.await;
                    ctx.users().save(User::new("tx", "t@x.com")).await
                })
            })
            .await
        }
    });
    assert_ok!(wait_opened.await);

    let direct = tokio::spawn({
        let uow = uow.clone();
        async move { uow.users().save(User::new("direct", "d@x.com")).await }
    });
    tokio::task::yield_now().await;
    assert!(!direct.is_finished());

    assert_ok!(release.send(()));
    let in_tx = assert_ok!(in_tx.await.unwrap());
    let direct = assert_ok!(direct.await.unwrap());

    assert_ne!(in_tx.id, direct.id);
    assert_eq!(
        assert_ok!(uow.users().get_by_id(direct.id.unwrap()).await),
        Some(direct.clone())
    );
    let mut users = assert_ok!(uow.users().find_all().await);
    users.sort_by_key(|u| u.id);
    assert_eq!(users, vec![in_tx, direct]);
}

#[tokio::test]
async fn test_concurrent_saves_get_distinct_ids() {
    let (uow, service) = setup();

    let saves = (0..16).map(|i| service.save_user(User::new(format!("user{i}"), format!("u{i}@x.com"))));
    let results = join_all(saves).await;

    let ids: HashSet<i64> = results
        .into_iter()
        .map(|r| r.unwrap().id.unwrap())
        .collect();
    assert_eq!(ids.len(), 16);
    assert_eq!(uow.store().len().await, 16);
}

#[tokio::test]
async fn test_service_reads_existing_store() {
    let store = Arc::new(InMemoryUserStore::new());
    assert_ok!(store.save(User::new("alice", "a@x.com")).await);
    let service = UserManager::new(Arc::new(InMemoryPersistence::with_store(store.clone())));

    let saved = assert_ok!(service.save_user(User::new("bob", "b@x.com")).await);

    assert_eq!(saved.id, Some(2));
    assert_eq!(assert_ok!(service.get_all_users().await).len(), 2);
    assert_eq!(store.len().await, 2);
}
