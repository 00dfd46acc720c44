//! Storage layer tests for the `QueryPilot` server.

use querypilot_core::{DatabaseKind, UserRole};

use super::Database;

async fn test_db() -> Database {
    Database::open_in_memory().await.unwrap()
}

async fn sample_connection(db: &Database, name: &str) -> i64 {
    db.create_connection(
        name,
        DatabaseKind::Postgresql,
        "jdbc:postgresql://db:5432/sales",
        "reader",
        "secret",
    )
    .await
    .unwrap()
    .id
}

// === User tests ===

#[tokio::test]
async fn create_and_get_user() {
    let db = test_db().await;
    let user = db
        .create_user("alice", "hash123", UserRole::Analyst)
        .await
        .unwrap();

    assert!(user.id > 0);
    assert_eq!(user.username, "alice");
    assert_eq!(user.role, "ANALYST");

    let identity = user.identity().unwrap();
    assert!(!identity.is_admin());
}

#[tokio::test]
async fn get_user_by_username() {
    let db = test_db().await;
    let created = db
        .create_user("alice", "hash123", UserRole::Admin)
        .await
        .unwrap();

    let user = db.get_user_by_username("alice").await.unwrap();
    assert_eq!(user.id, created.id);
    assert!(user.identity().unwrap().is_admin());

    assert!(db.get_user_by_username("bob").await.is_err());
}

#[tokio::test]
async fn set_user_role_promotes_and_demotes() {
    let db = test_db().await;
    let user = db
        .create_user("alice", "hash123", UserRole::Analyst)
        .await
        .unwrap();

    let promoted = db.set_user_role(user.id, UserRole::Admin).await.unwrap();
    assert_eq!(promoted.role, "ADMIN");

    let demoted = db.set_user_role(user.id, UserRole::Analyst).await.unwrap();
    assert_eq!(demoted.role, "ANALYST");
}

#[tokio::test]
async fn duplicate_username_rejected_by_schema() {
    let db = test_db().await;
    db.create_user("alice", "h1", UserRole::Analyst)
        .await
        .unwrap();
    assert!(
        db.create_user("alice", "h2", UserRole::Analyst)
            .await
            .is_err()
    );
}

// === Connection tests ===

#[tokio::test]
async fn create_list_and_get_connection() {
    let db = test_db().await;
    let id = sample_connection(&db, "Sales DB").await;

    let row = db.get_connection(id).await.unwrap();
    assert_eq!(row.name, "Sales DB");
    assert_eq!(row.db_type, "POSTGRESQL");
    assert!(row.schema_ddl.is_none());

    let all = db.list_connections().await.unwrap();
    assert_eq!(all.len(), 1);

    assert!(db.get_connection(id + 1).await.is_err());
}

#[tokio::test]
async fn update_schema_ddl_persists() {
    let db = test_db().await;
    let id = sample_connection(&db, "Sales DB").await;

    let row = db
        .update_schema_ddl(id, "CREATE TABLE orders (id INT);")
        .await
        .unwrap();
    assert_eq!(row.schema_ddl.as_deref(), Some("CREATE TABLE orders (id INT);"));
}

#[tokio::test]
async fn delete_connection_reports_existence() {
    let db = test_db().await;
    let id = sample_connection(&db, "Sales DB").await;

    assert!(db.delete_connection(id).await.unwrap());
    assert!(!db.delete_connection(id).await.unwrap());
}

#[tokio::test]
async fn summary_view_strips_schema_ddl() {
    let db = test_db().await;
    let id = sample_connection(&db, "Sales DB").await;
    db.update_schema_ddl(id, "CREATE TABLE t (id INT);")
        .await
        .unwrap();

    let row = db.get_connection(id).await.unwrap();
    assert!(row.to_connection().unwrap().schema_ddl.is_some());
    assert!(row.to_summary().unwrap().schema_ddl.is_none());
}

// === Permission tests ===

#[tokio::test]
async fn grant_is_idempotent() {
    let db = test_db().await;
    let user = db
        .create_user("alice", "h", UserRole::Analyst)
        .await
        .unwrap();
    let conn_id = sample_connection(&db, "Sales DB").await;

    let first = db.grant_permission(user.id, conn_id).await.unwrap();
    let second = db.grant_permission(user.id, conn_id).await.unwrap();
    assert_eq!(first.id, second.id);

    let grants = db.permissions_for_user(user.id).await.unwrap();
    assert_eq!(grants.len(), 1);
}

#[tokio::test]
async fn revoke_is_idempotent() {
    let db = test_db().await;
    let user = db
        .create_user("alice", "h", UserRole::Analyst)
        .await
        .unwrap();
    let conn_id = sample_connection(&db, "Sales DB").await;

    db.grant_permission(user.id, conn_id).await.unwrap();
    assert_eq!(db.revoke_permission(user.id, conn_id).await.unwrap(), 1);
    assert_eq!(db.revoke_permission(user.id, conn_id).await.unwrap(), 0);
    assert!(!db.has_permission(user.id, conn_id).await.unwrap());
}

#[tokio::test]
async fn grant_requires_existing_rows() {
    let db = test_db().await;
    let user = db
        .create_user("alice", "h", UserRole::Analyst)
        .await
        .unwrap();

    // Foreign keys reject a grant against a connection that does not exist.
    assert!(db.grant_permission(user.id, 999).await.is_err());
    assert!(db.grant_permission(999, 1).await.is_err());
}

#[tokio::test]
async fn deleting_a_connection_cascades_to_grants() {
    let db = test_db().await;
    let user = db
        .create_user("alice", "h", UserRole::Analyst)
        .await
        .unwrap();
    let keep = sample_connection(&db, "Keep").await;
    let drop = sample_connection(&db, "Drop").await;
    db.grant_permission(user.id, keep).await.unwrap();
    db.grant_permission(user.id, drop).await.unwrap();

    db.delete_connection(drop).await.unwrap();

    let grants = db.permissions_for_user(user.id).await.unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].connection_id, keep);

    let accessible = db.connections_for_user(user.id).await.unwrap();
    assert_eq!(accessible.len(), 1);
    assert_eq!(accessible[0].id, keep);
}

#[tokio::test]
async fn permissions_for_connection_lists_all_holders() {
    let db = test_db().await;
    let alice = db
        .create_user("alice", "h", UserRole::Analyst)
        .await
        .unwrap();
    let bob = db.create_user("bob", "h", UserRole::Analyst).await.unwrap();
    let conn_id = sample_connection(&db, "Sales DB").await;

    db.grant_permission(alice.id, conn_id).await.unwrap();
    db.grant_permission(bob.id, conn_id).await.unwrap();

    let holders = db.permissions_for_connection(conn_id).await.unwrap();
    assert_eq!(holders.len(), 2);
}
