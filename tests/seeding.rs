//! Seeding and audited commits against a real SQL backend (SQLite in memory)

use std::collections::BTreeSet;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{TimeZone, Utc};
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use tokio_test::assert_err;
use tokio_util::sync::CancellationToken;

use rbacdesk::db;
use rbacdesk::entity::{permission, role};
use rbacdesk::error::{AppError, StoreError};
use rbacdesk::seed::{self, Catalog};
use rbacdesk::store::{AuditingStore, DatabaseStore, FixedClock, Tracked};

async fn setup() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opt).await.unwrap();
    db::auto_migrate(&db).await.unwrap();
    db
}

async fn role_names(db: &DatabaseConnection) -> BTreeSet<String> {
    role::Entity::find()
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect()
}

#[tokio::test]
async fn seeds_empty_database_once() {
    let db = setup().await;

    let mut store = AuditingStore::new(DatabaseStore::new(db.clone()));
    let report = seed::seed(&mut store, &Catalog::default()).await.unwrap();
    assert_eq!(report.rows_affected, 15);

    assert_eq!(
        role_names(&db).await,
        ["Admin", "User"]
            .iter()
            .map(|s| s.to_string())
            .collect::<BTreeSet<_>>()
    );
    assert_eq!(permission::Entity::find().count(&db).await.unwrap(), 5);

    let mut store = AuditingStore::new(DatabaseStore::new(db.clone()));
    let again = seed::seed(&mut store, &Catalog::default()).await.unwrap();
    assert!(again.created.is_empty());
    assert_eq!(again.rows_affected, 0);
    assert_eq!(role::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn preexisting_admin_keeps_create_at() {
    let db = setup().await;
    let created = Utc.with_ymd_and_hms(2023, 11, 2, 10, 30, 0).unwrap();

    let mut store =
        AuditingStore::new(DatabaseStore::new(db.clone())).with_clock(FixedClock(created));
    store.stage_insert(Tracked::Role(role::ActiveModel {
        name: Set("Admin".to_string()),
        description: Set("installed by hand".to_string()),
        ..Default::default()
    }));
    assert_eq!(store.commit().await.unwrap(), 1);

    let mut store = AuditingStore::new(DatabaseStore::new(db.clone()));
    seed::seed(&mut store, &Catalog::default()).await.unwrap();

    let admin = role::Entity::find()
        .filter(role::Column::Name.eq("Admin"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(admin.create_at, created);
    assert_eq!(admin.description, "installed by hand");
    assert_eq!(role_names(&db).await.len(), 2);
}

#[tokio::test]
async fn audited_insert_stamps_create_at() {
    let db = setup().await;
    let now = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 0).unwrap();

    let mut store = AuditingStore::new(DatabaseStore::new(db.clone())).with_clock(FixedClock(now));
    store.stage_insert(Tracked::Permission(permission::ActiveModel {
        code: Set("EXPORT".to_string()),
        name: Set("Export".to_string()),
        description: Set(String::new()),
        ..Default::default()
    }));
    store.commit().await.unwrap();

    let row = permission::Entity::find()
        .filter(permission::Column::Code.eq("EXPORT"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.create_at, now);
    assert!(row.active);
    assert!(row.lifecycle().is_live());
}

#[tokio::test]
async fn soft_delete_keeps_row() {
    let db = setup().await;
    let mut store = AuditingStore::new(DatabaseStore::new(db.clone()));
    seed::seed(&mut store, &Catalog::default()).await.unwrap();

    let user = role::Entity::find()
        .filter(role::Column::Name.eq("User"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();

    let mut store = AuditingStore::new(DatabaseStore::new(db.clone()));
    store.stage_delete(Tracked::Role(role::ActiveModel {
        id: ActiveValue::Unchanged(user.id),
        ..Default::default()
    }));
    store.commit().await.unwrap();

    let after = role::Entity::find_by_id(user.id).one(&db).await.unwrap().unwrap();
    assert!(!after.active);
    assert!(after.delete_at.is_some());
    assert_eq!(after.create_at, user.create_at);
}

#[tokio::test]
async fn cancelled_commit_writes_nothing() {
    let db = setup().await;
    let mut store = AuditingStore::new(DatabaseStore::new(db.clone()));
    store.stage_insert(Tracked::Role(role::ActiveModel {
        name: Set("Auditor".to_string()),
        description: Set(String::new()),
        ..Default::default()
    }));

    let token = CancellationToken::new();
    token.cancel();
    let err = assert_err!(store.commit_cancellable(&token).await);
    assert!(matches!(err, StoreError::OperationCancelled));
    assert_eq!(role::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn unique_violation_propagates() {
    let db = setup().await;
    let mut store = AuditingStore::new(DatabaseStore::new(db.clone()));
    seed::seed(&mut store, &Catalog::default()).await.unwrap();

    // bypass the natural-key check and hit the unique column directly
    store.stage_insert(Tracked::Role(role::ActiveModel {
        name: Set("Admin".to_string()),
        description: Set(String::new()),
        ..Default::default()
    }));
    let err = assert_err!(store.commit().await);
    assert!(matches!(err, StoreError::Database(_)));
    assert_eq!(role::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn racing_duplicate_insert_is_a_conflict() {
    let db = setup().await;
    let mut store = AuditingStore::new(DatabaseStore::new(db.clone()));
    seed::seed(&mut store, &Catalog::default()).await.unwrap();

    // the natural-key check passed earlier, another writer got there first
    store.stage_insert(Tracked::Role(role::ActiveModel {
        name: Set("User".to_string()),
        description: Set(String::new()),
        ..Default::default()
    }));
    let err = assert_err!(store.commit().await);

    let app_err = AppError::from(err);
    assert!(matches!(app_err, AppError::Conflict(_)));
    assert_eq!(app_err.into_response().status(), StatusCode::CONFLICT);
}

#[test]
fn shipped_catalog_file_matches_builtin() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/etc/catalog.toml");
    assert_eq!(Catalog::load(path).unwrap(), Catalog::default());
}
