//! Integration tests for the user repository.
//!
//! Covers creation, uniqueness, validation, soft delete visibility and
//! password handling against an in-memory SQLite store.

use accounts::db::Store;
use accounts::error::AccountError;
use accounts::models::{NewUser, RoleFlags, UserUpdate};
use sea_orm::{ConnectionTrait, DbBackend, Statement};

async fn spawn_store() -> Store {
    // One connection: every pooled connection would get its own in-memory database
    Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to create in-memory store")
}

fn alice() -> NewUser {
    NewUser::new("alice", "a@x.com", "09121234567")
}

#[tokio::test]
async fn test_create_and_get_by_phone_number() {
    let store = spawn_store().await;

    let created = store.create_user(alice()).await.unwrap();
    assert_eq!(created.username, "alice");
    assert!(!created.is_admin);
    assert!(!created.is_staff);
    assert!(!created.is_superuser);
    assert!(!created.is_deleted);
    assert!(!created.has_usable_password);
    assert!(!created.create_time.is_empty());
    assert_eq!(created.create_time, created.update_time);

    let fetched = store
        .get_user_by_phone_number("09121234567")
        .await
        .unwrap()
        .expect("user should exist");
    assert_eq!(fetched, created);
    assert_eq!(fetched.to_string(), "alice - 09121234567");

    let all = store.list_users().await.unwrap();
    assert_eq!(
        all.iter()
            .filter(|u| u.phone_number == "09121234567")
            .count(),
        1
    );
}

#[tokio::test]
async fn test_duplicate_phone_number_is_conflict() {
    let store = spawn_store().await;
    store.create_user(alice()).await.unwrap();

    let err = store
        .create_user(NewUser::new("alice2", "other@x.com", "09121234567"))
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::Conflict(_)), "got {err:?}");

    let matches = store.list_users().await.unwrap();
    assert_eq!(matches.len(), 1);
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let store = spawn_store().await;
    store.create_user(alice()).await.unwrap();

    let err = store
        .create_user(NewUser::new("alice", "other@x.com", "09120000000"))
        .await
        .unwrap_err();

    assert!(err.is_conflict(), "got {err:?}");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let store = spawn_store().await;
    store.create_user(alice()).await.unwrap();

    // Domain case is normalized before the write
    let err = store
        .create_user(NewUser::new("bob", "a@X.COM", "09120000000"))
        .await
        .unwrap_err();

    assert!(err.is_conflict(), "got {err:?}");
}

#[tokio::test]
async fn test_duplicate_username_email_pair_is_conflict() {
    let store = spawn_store().await;
    store.create_user(alice()).await.unwrap();

    let err = store
        .create_user(NewUser::new("alice", "a@x.com", "09120000000"))
        .await
        .unwrap_err();

    assert!(err.is_conflict(), "got {err:?}");
}

#[tokio::test]
async fn test_schema_has_named_indexes() {
    let store = spawn_store().await;

    let rows = store
        .conn
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT name, sql FROM sqlite_master WHERE type = 'index' AND tbl_name = 'users' AND sql IS NOT NULL"
                .to_string(),
        ))
        .await
        .unwrap();

    let indexes: Vec<(String, String)> = rows
        .iter()
        .map(|row| {
            (
                row.try_get::<String>("", "name").unwrap(),
                row.try_get::<String>("", "sql").unwrap(),
            )
        })
        .collect();

    let composite_unique = indexes
        .iter()
        .find(|(name, _)| name == "unique_username_email")
        .expect("unique_username_email index missing");
    assert!(composite_unique.1.contains("UNIQUE"));

    let lookup = indexes
        .iter()
        .find(|(name, _)| name == "index_username_phone_number")
        .expect("index_username_phone_number index missing");
    assert!(!lookup.1.contains("UNIQUE"));
}

#[tokio::test]
async fn test_validation_runs_before_write() {
    let store = spawn_store().await;

    let bad_phone = store
        .create_user(NewUser::new("alice", "a@x.com", "12345"))
        .await
        .unwrap_err();
    match bad_phone {
        AccountError::Validation(e) => assert_eq!(e.field, "phone_number"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let bad_email = store
        .create_user(NewUser::new("alice", "not-an-email", "09121234567"))
        .await
        .unwrap_err();
    assert!(matches!(bad_email, AccountError::Validation(ref e) if e.field == "email"));

    let bad_username = store
        .create_user(NewUser::new("alice smith", "a@x.com", "09121234567"))
        .await
        .unwrap_err();
    assert!(matches!(bad_username, AccountError::Validation(ref e) if e.field == "username"));

    let missing = store
        .create_user(NewUser::new("", "a@x.com", "09121234567"))
        .await
        .unwrap_err();
    assert!(matches!(missing, AccountError::Validation(_)));

    assert!(store.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_soft_delete_hides_from_active_queries() {
    let store = spawn_store().await;
    let user = store.create_user(alice()).await.unwrap();
    store
        .create_user(NewUser::new("bob", "b@x.com", "09127654321"))
        .await
        .unwrap();

    let deleted = store.soft_delete_user(user.id).await.unwrap();
    assert!(deleted.is_deleted);

    assert!(
        store
            .get_active_user_by_phone_number("09121234567")
            .await
            .unwrap()
            .is_none()
    );

    let still_there = store
        .get_user_by_phone_number("09121234567")
        .await
        .unwrap()
        .expect("soft-deleted user must remain retrievable");
    assert!(still_there.is_deleted);

    let active = store.list_active_users().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].username, "bob");

    assert_eq!(store.list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_restore_brings_user_back() {
    let store = spawn_store().await;
    let user = store.create_user(alice()).await.unwrap();

    store.soft_delete_user(user.id).await.unwrap();
    // Deleting twice is harmless
    store.soft_delete_user(user.id).await.unwrap();

    let restored = store.restore_user(user.id).await.unwrap();
    assert!(!restored.is_deleted);

    assert!(
        store
            .get_active_user_by_phone_number("09121234567")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_soft_delete_unknown_user_is_not_found() {
    let store = spawn_store().await;

    let err = store.soft_delete_user(4242).await.unwrap_err();
    assert!(matches!(err, AccountError::NotFound(_)));
}

#[tokio::test]
async fn test_list_orders_by_latest_update() {
    let store = spawn_store().await;
    let first = store.create_user(alice()).await.unwrap();
    store
        .create_user(NewUser::new("bob", "b@x.com", "09127654321"))
        .await
        .unwrap();

    let listed = store.list_users().await.unwrap();
    assert_eq!(listed[0].username, "bob");

    store
        .update_user_profile(
            first.id,
            UserUpdate {
                email: Some("alice@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let listed = store.list_users().await.unwrap();
    assert_eq!(listed[0].username, "alice");
    assert_eq!(listed[0].email, "alice@example.com");
}

#[tokio::test]
async fn test_update_profile_validates_and_detects_conflicts() {
    let store = spawn_store().await;
    let user = store.create_user(alice()).await.unwrap();
    store
        .create_user(NewUser::new("bob", "b@x.com", "09127654321"))
        .await
        .unwrap();

    let invalid = store
        .update_user_profile(
            user.id,
            UserUpdate {
                username: Some("no spaces allowed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(invalid, AccountError::Validation(_)));

    let taken = store
        .update_user_profile(
            user.id,
            UserUpdate {
                username: Some("bob".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(taken.is_conflict());

    let renamed = store
        .update_user_profile(
            user.id,
            UserUpdate {
                username: Some("alice_w".to_string()),
                email: Some("Alice@Example.ORG".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.username, "alice_w");
    assert_eq!(renamed.email, "Alice@example.org");
    assert_eq!(renamed.phone_number, "09121234567");
    assert_eq!(renamed.create_time, user.create_time);
}

#[tokio::test]
async fn test_staff_and_superuser_creation_paths() {
    let store = spawn_store().await;

    let staff = store.create_staff_user(alice()).await.unwrap();
    assert_eq!(staff.flags(), RoleFlags::staff());

    // Flags requested by the caller do not weaken a superuser
    let root = store
        .create_superuser(
            NewUser::new("root", "root@x.com", "09120000000").with_flags(RoleFlags::default()),
        )
        .await
        .unwrap();
    assert!(root.is_admin);
    assert!(root.is_staff);
    assert!(root.is_superuser);

    let demoted = store
        .set_user_flags(root.id, RoleFlags::staff())
        .await
        .unwrap();
    assert!(demoted.is_staff);
    assert!(!demoted.is_superuser);
    assert!(!demoted.is_admin);
}

#[tokio::test]
async fn test_password_lifecycle() {
    let store = spawn_store().await;

    let user = store
        .create_user(alice().with_password("hunter2hunter2"))
        .await
        .unwrap();
    assert!(user.has_usable_password);

    assert!(
        store
            .check_user_password("09121234567", "hunter2hunter2")
            .await
            .unwrap()
    );
    assert!(
        !store
            .check_user_password("09121234567", "wrong password")
            .await
            .unwrap()
    );
    assert!(
        !store
            .check_user_password("09129999999", "hunter2hunter2")
            .await
            .unwrap()
    );

    store
        .set_user_password(user.id, "correct horse battery")
        .await
        .unwrap();
    assert!(
        store
            .check_user_password("09121234567", "correct horse battery")
            .await
            .unwrap()
    );

    let too_short = store.set_user_password(user.id, "short").await.unwrap_err();
    assert!(matches!(too_short, AccountError::Validation(ref e) if e.field == "password"));

    store.soft_delete_user(user.id).await.unwrap();
    assert!(
        !store
            .check_user_password("09121234567", "correct horse battery")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_user_without_password_never_verifies() {
    let store = spawn_store().await;
    store.create_user(alice()).await.unwrap();

    assert!(
        !store
            .check_user_password("09121234567", "")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_record_login_stamps_last_login() {
    let store = spawn_store().await;
    let user = store.create_user(alice()).await.unwrap();
    assert!(user.last_login.is_none());

    let logged_in = store.record_user_login(user.id).await.unwrap();
    assert!(logged_in.last_login.is_some());
}

#[tokio::test]
async fn test_lookup_by_username_and_email() {
    use accounts::entities::lifecycle::SoftDelete;
    use accounts::entities::users;

    let store = spawn_store().await;
    let user = store.create_user(alice()).await.unwrap();
    let repo = store.user_repo();

    let by_username = repo.get_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_username.id, user.id);

    // Lookup normalizes the domain the same way creation does
    let by_email = repo.get_by_email("a@X.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    assert!(repo.get_by_username("nobody").await.unwrap().is_none());

    assert!(users::Entity::find_deleted().all(&store.conn).await.unwrap().is_empty());
    store.soft_delete_user(user.id).await.unwrap();
    let deleted = users::Entity::find_deleted().all(&store.conn).await.unwrap();
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].id, user.id);
}

#[tokio::test]
async fn test_deactivate_deletes_user_and_revokes_tokens_together() {
    use accounts::entities::user_auths::TokenType;

    let store = spawn_store().await;
    let user = store.create_user(alice()).await.unwrap();
    store.create_token(user.id, TokenType::Access).await.unwrap();
    store.create_token(user.id, TokenType::Refresh).await.unwrap();
    let other = store.create_token(user.id + 1, TokenType::Access).await.unwrap();

    let (deactivated, revoked) = store.deactivate_user(user.id).await.unwrap();
    assert!(deactivated.is_deleted);
    assert_eq!(revoked, 2);
    assert!(
        store
            .list_active_tokens_for_user(user.id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(store.get_active_token(other.uuid).await.unwrap().is_some());

    // A second call finds nothing left to revoke
    let (again, revoked) = store.deactivate_user(user.id).await.unwrap();
    assert!(again.is_deleted);
    assert_eq!(revoked, 0);

    let missing = store.deactivate_user(4242).await.unwrap_err();
    assert!(matches!(missing, AccountError::NotFound(_)));
}
