//! Database-backed tests for the subscription routes
//!
//! ## Running Tests
//! ```bash
//! export DATABASE_URL="postgres://localhost/subtrack_test"
//! cargo test -p subtrack-api --test subscriptions_db -- --ignored --test-threads=1
//! ```

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use serial_test::serial;
use subtrack_api::{
    config::{AppEnv, Config},
    create_router, AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Test Utilities
// ============================================================================

async fn setup_app() -> Router {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for integration tests");

    let pool = subtrack_shared::create_pool(&database_url, 2)
        .await
        .expect("Failed to connect to test database");
    subtrack_shared::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let config = Config {
        env: AppEnv::Local,
        bind_address: "127.0.0.1:0".to_string(),
        request_timeout: Duration::from_secs(10),
        shutdown_grace: Duration::from_secs(1),
        database_url,
        database_max_connections: 2,
        list_default_limit: 100,
    };

    create_router(AppState::new(pool, config))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a subscription and return its id
async fn create(
    app: &Router,
    user_id: Uuid,
    service: &str,
    price: i64,
    start: &str,
    end: Option<&str>,
) -> String {
    let mut body = json!({
        "service_name": service,
        "price": price,
        "user_id": user_id.to_string(),
        "start_date": start,
    });
    if let Some(end) = end {
        body["end_date"] = json!(end);
    }

    let response = call(app, Method::POST, "/subscriptions", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["id"].as_str().unwrap().to_string()
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn test_subscription_lifecycle() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    let id = create(&app, user_id, "Yandex Plus", 400, "07-2025", None).await;

    // Read back
    let response = call(&app, Method::GET, &format!("/subscriptions/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["service_name"], "Yandex Plus");
    assert_eq!(body["price"], 400);
    assert_eq!(body["user_id"], user_id.to_string());
    assert_eq!(body["start_date"], "07-2025");
    assert_eq!(body["end_date"], Value::Null);

    // Update
    let response = call(
        &app,
        Method::PUT,
        &format!("/subscriptions/{id}"),
        Some(json!({
            "service_name": "Yandex Plus",
            "price": 500,
            "user_id": user_id.to_string(),
            "start_date": "07-2025",
            "end_date": "12-2025",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = json_body(call(&app, Method::GET, &format!("/subscriptions/{id}"), None).await).await;
    assert_eq!(body["price"], 500);
    assert_eq!(body["end_date"], "12-2025");

    // Delete
    let response = call(&app, Method::DELETE, &format!("/subscriptions/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = call(&app, Method::GET, &format!("/subscriptions/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn test_update_and_delete_unknown_id() {
    let app = setup_app().await;
    let missing = Uuid::new_v4();

    let response = call(
        &app,
        Method::PUT,
        &format!("/subscriptions/{missing}"),
        Some(json!({
            "service_name": "Nothing",
            "price": 1,
            "user_id": Uuid::new_v4().to_string(),
            "start_date": "01-2024",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = call(&app, Method::DELETE, &format!("/subscriptions/{missing}"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn test_list_filters_and_limit() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    create(&app, user_id, "Netflix", 100, "01-2024", None).await;
    create(&app, user_id, "Spotify Family", 200, "01-2024", None).await;
    create(&app, user_id, "100% Music", 300, "01-2024", None).await;

    let uri = format!("/subscriptions?user_id={user_id}");
    let all = json_body(call(&app, Method::GET, &uri, None).await).await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let uri = format!("/subscriptions?user_id={user_id}&service_name=spotify");
    let matched = json_body(call(&app, Method::GET, &uri, None).await).await;
    assert_eq!(matched.as_array().unwrap().len(), 1);
    assert_eq!(matched[0]["service_name"], "Spotify Family");

    // `%` matches literally
    let uri = format!("/subscriptions?user_id={user_id}&service_name=0%25");
    let matched = json_body(call(&app, Method::GET, &uri, None).await).await;
    assert_eq!(matched.as_array().unwrap().len(), 1);
    assert_eq!(matched[0]["service_name"], "100% Music");

    let uri = format!("/subscriptions?user_id={user_id}&limit=2");
    let limited = json_body(call(&app, Method::GET, &uri, None).await).await;
    assert_eq!(limited.as_array().unwrap().len(), 2);
}

// ============================================================================
// Aggregation
// ============================================================================

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn test_aggregate_total_for_user() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    create(&app, user_id, "Music", 100, "01-2023", Some("03-2023")).await;
    create(&app, user_id, "Video", 200, "02-2023", Some("02-2023")).await;
    // Outside the window
    create(&app, user_id, "Books", 999, "05-2023", None).await;

    let uri = format!("/subscriptions/aggregate?from=01-2023&to=03-2023&user_id={user_id}");
    let response = call(&app, Method::GET, &uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"total": 500}));
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn test_aggregate_open_ended_and_breakdown() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    let open = create(&app, user_id, "Cloud", 400, "01-2023", None).await;
    create(&app, user_id, "Old", 400, "01-2023", Some("12-2023")).await;

    let uri = format!(
        "/subscriptions/aggregate?from=07-2024&to=07-2024&user_id={user_id}&breakdown=true"
    );
    let body = json_body(call(&app, Method::GET, &uri, None).await).await;
    assert_eq!(body["total"], 400);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], open);
    assert_eq!(items[0]["months"], 1);
    assert_eq!(items[0]["cost"], 400);
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn test_aggregate_service_name_filter() {
    let app = setup_app().await;
    let user_id = Uuid::new_v4();

    create(&app, user_id, "Yandex Plus", 300, "01-2024", Some("06-2024")).await;
    create(&app, user_id, "Netflix", 1000, "01-2024", Some("06-2024")).await;

    let uri = format!(
        "/subscriptions/aggregate?from=01-2024&to=12-2024&user_id={user_id}&service_name=yandex"
    );
    let body = json_body(call(&app, Method::GET, &uri, None).await).await;
    assert_eq!(body["total"], 300 * 6);
}

#[tokio::test]
#[ignore] // Requires database
#[serial]
async fn test_health_with_database() {
    let app = setup_app().await;

    let response = call(&app, Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "healthy");
}
