//! HTTP API over a seeded SQLite database

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use sea_orm::{ConnectOptions, Database};
use serde_json::{json, Value};
use tower::ServiceExt;

use rbacdesk::seed::{self, Catalog};
use rbacdesk::store::{AuditingStore, DatabaseStore};
use rbacdesk::{db, routes, AppState, Config};

async fn app() -> Router {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);
    let conn = Database::connect(opt).await.unwrap();
    db::auto_migrate(&conn).await.unwrap();

    let catalog = Catalog::default();
    let mut store = AuditingStore::new(DatabaseStore::new(conn.clone()));
    seed::seed(&mut store, &catalog).await.unwrap();

    routes::create_router(AppState::new(conn, Config::default(), catalog))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn keys(body: &Value, field: &str) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row[field].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_reports_database() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], true);
}

#[tokio::test]
async fn lists_seeded_catalog() {
    let app = app().await;

    let (_, roles) = call(&app, Method::GET, "/api/roles", None).await;
    assert_eq!(keys(&roles, "name"), vec!["Admin", "User"]);

    let (_, permissions) = call(&app, Method::GET, "/api/permissions", None).await;
    assert_eq!(
        keys(&permissions, "code"),
        vec!["READ", "WRITE", "UPDATE", "DELETE", "ADMIN"]
    );

    let (_, modules) = call(&app, Method::GET, "/api/modules", None).await;
    assert_eq!(keys(&modules, "name"), vec!["Users", "Roles", "Permissions", "Settings"]);

    let (_, forms) = call(&app, Method::GET, "/api/forms", None).await;
    assert_eq!(
        keys(&forms, "code"),
        vec!["LOGIN_FORM", "REGISTER_FORM", "USER_FORM", "ROLE_FORM"]
    );
}

#[tokio::test]
async fn role_lifecycle() {
    let app = app().await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/api/roles",
        Some(json!({ "name": "Auditor", "description": "reads logs" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["data"]["active"], true);
    assert!(created["data"]["deleteAt"].is_null());
    let id = created["data"]["id"].as_i64().unwrap();
    let create_at = created["data"]["createAt"].clone();

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/roles",
        Some(json!({ "name": "Auditor" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = call(
        &app,
        Method::PUT,
        &format!("/api/roles/{}", id),
        Some(json!({ "description": "reads and exports logs" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["description"], "reads and exports logs");
    assert_eq!(updated["data"]["createAt"], create_at);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/roles/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, roles) = call(&app, Method::GET, "/api/roles", None).await;
    assert_eq!(keys(&roles, "name"), vec!["Admin", "User"]);

    let (status, _) = call(&app, Method::DELETE, &format!("/api/roles/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn builtin_roles_cannot_be_deleted() {
    let app = app().await;
    let (_, roles) = call(&app, Method::GET, "/api/roles", None).await;
    let admin_id = roles["data"][0]["id"].as_i64().unwrap();

    let (status, body) = call(&app, Method::DELETE, &format!("/api/roles/{}", admin_id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn rejects_invalid_role_names() {
    let app = app().await;
    let (status, _) = call(&app, Method::POST, "/api/roles", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_falls_back() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], false);
}
