//! End-to-end tests that drive the real router in process.
//!
//! Each test builds a fresh in-memory store and session gate, opens
//! sessions for one user per role, and sends requests with
//! `tower::ServiceExt::oneshot`.

#![allow(clippy::panic, clippy::indexing_slicing, missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use stockroom::api::build_app;
use stockroom::app_state::AppState;
use stockroom::auth::{IdentityGate, SessionGate};
use stockroom::config::BootstrapUser;
use stockroom::domain::{Actor, Role, UserId};
use stockroom::store::{CatalogStore, MemoryStore};

struct Harness {
    app: Router,
    admin: String,
    manager: String,
    staff: String,
}

async fn session(gate: &SessionGate, role: Role) -> String {
    gate.issue_session(Actor {
        id: UserId::new(),
        username: format!("{role}-user"),
        role,
    })
    .await
    .token
}

async fn harness_with(gate: SessionGate) -> Harness {
    let gate = Arc::new(gate);
    let admin = session(&gate, Role::Admin).await;
    let manager = session(&gate, Role::Manager).await;
    let staff = session(&gate, Role::Staff).await;
    let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
    let identity: Arc<dyn IdentityGate> = gate;
    let state = AppState::new(store, identity, 5, Duration::from_secs(15));
    Harness {
        app: build_app(state),
        admin,
        manager,
        staff,
    }
}

async fn harness() -> Harness {
    harness_with(SessionGate::new(chrono::Duration::minutes(30))).await
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let Ok(request) = builder.body(body) else {
        panic!("request builds");
    };
    let Ok(response) = app.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    let status = response.status();
    let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
        panic!("body readable");
    };
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_category(h: &Harness, name: &str) -> Value {
    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/categories",
        Some(&h.admin),
        Some(json!({"name": name, "description": "Things we sell"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn create_product(h: &Harness, category_id: &Value, sku: &str) -> (StatusCode, Value) {
    call(
        &h.app,
        Method::POST,
        "/api/products",
        Some(&h.manager),
        Some(json!({
            "name": "Cotton shirt",
            "description": "White",
            "price": 199.5,
            "stock": 4,
            "sku": sku,
            "categoryId": category_id,
        })),
    )
    .await
}

async fn history(h: &Harness) -> Vec<Value> {
    let (status, body) = call(
        &h.app,
        Method::GET,
        "/api/reports/history?timeRange=7",
        Some(&h.staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let Value::Array(entries) = body else {
        panic!("history is an array");
    };
    entries
}

#[tokio::test]
async fn duplicate_category_name_conflicts_and_list_grows_by_one() {
    let h = harness().await;
    let (status, created) = call(
        &h.app,
        Method::POST,
        "/api/categories",
        Some(&h.admin),
        Some(json!({"name": "เสื้อผ้า", "description": "สินค้าเกี่ยวกับเครื่องแต่งกาย"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].is_string());

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/categories",
        Some(&h.admin),
        Some(json!({"name": "เสื้อผ้า", "description": "สินค้าเกี่ยวกับเครื่องแต่งกาย"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "conflict");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (_, list) = call(&h.app, Method::GET, "/api/categories", Some(&h.staff), None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn duplicate_sku_conflicts_and_unknown_category_is_invalid() {
    let h = harness().await;
    let category = create_category(&h, "Apparel").await;

    let (status, product) = create_product(&h, &category["id"], "SKU-1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["status"], "active");
    assert_eq!(product["categoryId"], category["id"]);

    let (status, _) = create_product(&h, &category["id"], "SKU-1").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = create_product(&h, &json!(UserId::new()), "SKU-2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid");
}

#[tokio::test]
async fn role_matrix_is_enforced() {
    let h = harness().await;
    let category = create_category(&h, "Drinks").await;
    let id = category["id"].as_str().unwrap_or_default().to_string();

    let (status, _) = call(
        &h.app,
        Method::DELETE,
        &format!("/api/categories/{id}"),
        Some(&h.staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &h.app,
        Method::POST,
        "/api/products",
        Some(&h.staff),
        Some(json!({"name": "Tea", "price": 1, "stock": 1, "sku": "T", "categoryId": id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &h.app,
        Method::DELETE,
        &format!("/api/categories/{id}"),
        Some(&h.manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &h.app,
        Method::DELETE,
        &format!("/api/categories/{id}"),
        Some(&h.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCategory"]["name"], "Drinks");
}

#[tokio::test]
async fn referenced_category_cannot_be_deleted() {
    let h = harness().await;
    let category = create_category(&h, "Apparel").await;
    let (_, product) = create_product(&h, &category["id"], "SKU-1").await;
    let before = history(&h).await.len();

    let uri = format!("/api/categories/{}", category["id"].as_str().unwrap_or_default());
    let (status, body) = call(&h.app, Method::DELETE, &uri, Some(&h.admin), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("1 product")));

    let uri = format!("/api/products/{}", product["id"].as_str().unwrap_or_default());
    let (status, fetched) = call(&h.app, Method::GET, &uri, Some(&h.staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["categoryId"], category["id"]);
    assert_eq!(history(&h).await.len(), before);
}

#[tokio::test]
async fn deleting_unknown_ids_is_not_found_and_unlogged() {
    let h = harness().await;
    create_category(&h, "Apparel").await;
    let before = history(&h).await.len();

    for uri in [
        format!("/api/categories/{}", UserId::new()),
        format!("/api/products/{}", UserId::new()),
    ] {
        let (status, body) = call(&h.app, Method::DELETE, &uri, Some(&h.admin), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["kind"], "not_found");
    }
    assert_eq!(history(&h).await.len(), before);
}

#[tokio::test]
async fn history_keeps_name_at_time_of_action() {
    let h = harness().await;
    let category = create_category(&h, "Beverages").await;
    let uri = format!("/api/categories/{}", category["id"].as_str().unwrap_or_default());
    let (status, _) = call(
        &h.app,
        Method::PUT,
        &uri,
        Some(&h.manager),
        Some(json!({"name": "Drinks", "description": "Things we sell"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let entries = history(&h).await;
    assert_eq!(entries.len(), 2);
    // Newest first.
    assert_eq!(entries[0]["action"], "update");
    assert_eq!(entries[0]["entityName"], "Drinks");
    assert_eq!(entries[0]["oldValues"]["name"], "Beverages");
    assert_eq!(entries[1]["action"], "create");
    assert_eq!(entries[1]["entityName"], "Beverages");
    assert!(entries[1].get("oldValues").is_none());
    assert_eq!(entries[1]["userName"], "admin-user");

    let (status, creates) = call(
        &h.app,
        Method::GET,
        "/api/reports/history?timeRange=30&action=create",
        Some(&h.staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(creates.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn statistics_track_live_prices_and_stock() {
    let h = harness().await;
    let category = create_category(&h, "Apparel").await;
    let (_, product) = create_product(&h, &category["id"], "SKU-1").await;

    let (status, stats) =
        call(&h.app, Method::GET, "/api/reports/statistics", Some(&h.staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalProducts"], 1);
    assert_eq!(stats["lowStockProducts"], 1);
    assert_eq!(stats["totalValue"].as_f64(), Some(798.0));

    let uri = format!("/api/products/{}", product["id"].as_str().unwrap_or_default());
    let (status, _) = call(
        &h.app,
        Method::PUT,
        &uri,
        Some(&h.admin),
        Some(json!({
            "name": "Cotton shirt",
            "price": 10,
            "stock": 20,
            "sku": "SKU-1",
            "status": "inactive",
            "categoryId": category["id"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) =
        call(&h.app, Method::GET, "/api/reports/statistics", Some(&h.staff), None).await;
    assert_eq!(stats["totalValue"].as_f64(), Some(200.0));
    assert_eq!(stats["lowStockProducts"], 0);
    assert_eq!(stats["activeProducts"], 0);
    assert_eq!(stats["categoryStats"][0]["count"], 1);
}

#[tokio::test]
async fn statistics_survive_the_largest_accepted_products() {
    let h = harness().await;
    let category = create_category(&h, "Warehouse").await;
    let lot = |sku: &str, stock: i64| {
        json!({
            "name": "Bulk lot",
            "price": 99_999_999_999.99,
            "stock": stock,
            "sku": sku,
            "categoryId": category["id"],
        })
    };

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/products",
        Some(&h.admin),
        Some(lot("LOT-0", i64::MAX)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    for sku in ["LOT-1", "LOT-2"] {
        let (status, body) = call(
            &h.app,
            Method::POST,
            "/api/products",
            Some(&h.admin),
            Some(lot(sku, 1_000_000_000)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
    }

    let (status, stats) =
        call(&h.app, Method::GET, "/api/reports/statistics", Some(&h.staff), None).await;
    assert_eq!(status, StatusCode::OK, "{stats}");
    assert_eq!(stats["totalProducts"], 2);
}

#[tokio::test]
async fn product_list_filters_by_keyword_and_category_alias() {
    let h = harness().await;
    let apparel = create_category(&h, "Apparel").await;
    let drinks = create_category(&h, "Drinks").await;
    create_product(&h, &apparel["id"], "SKU-1").await;
    create_product(&h, &drinks["id"], "SKU-2").await;

    let uri = format!(
        "/api/products?category={}&keyword=COTTON",
        drinks["id"].as_str().unwrap_or_default()
    );
    let (status, list) = call(&h.app, Method::GET, &uri, Some(&h.staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
    assert_eq!(list[0]["sku"], "SKU-2");

    let (status, body) = call(
        &h.app,
        Method::GET,
        "/api/products?minPrice=abc",
        Some(&h.staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid");
}

#[tokio::test]
async fn missing_or_bad_credentials_are_unauthenticated() {
    let h = harness().await;
    let (status, body) = call(&h.app, Method::GET, "/api/categories", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "unauthenticated");

    let (status, _) =
        call(&h.app, Method::GET, "/api/categories", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_bodies_are_invalid_with_message() {
    let h = harness().await;
    let Ok(request) = Request::builder()
        .method(Method::POST)
        .uri("/api/categories")
        .header("authorization", format!("Bearer {}", h.admin))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
    else {
        panic!("request builds");
    };
    let Ok(response) = h.app.clone().oneshot(request).await else {
        panic!("router is infallible");
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/products",
        Some(&h.admin),
        Some(json!({"name": "Tea", "price": "free", "stock": 1, "sku": "T", "categoryId": UserId::new()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, body) = call(
        &h.app,
        Method::POST,
        "/api/categories",
        Some(&h.admin),
        Some(json!({"description": "Missing a name"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");
}

#[tokio::test]
async fn seeding_is_admin_only_and_idempotent() {
    let h = harness().await;
    let (status, _) = call(
        &h.app,
        Method::POST,
        "/api/categories/seed",
        Some(&h.manager),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        call(&h.app, Method::POST, "/api/categories/seed", Some(&h.admin), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["categories"].as_array().map(Vec::len), Some(3));

    let (status, body) =
        call(&h.app, Method::POST, "/api/categories/seed", Some(&h.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"].as_array().map(Vec::len), Some(0));
    assert_eq!(history(&h).await.len(), 3);
}

#[tokio::test]
async fn login_me_logout_round_trip() {
    let users = [BootstrapUser {
        username: "somsri".to_string(),
        password: "correct horse".to_string(),
        role: Role::Manager,
    }];
    let Ok(gate) = SessionGate::with_users(&users, chrono::Duration::minutes(30)) else {
        panic!("provisioning");
    };
    let h = harness_with(gate).await;

    let (status, _) = call(
        &h.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"username": "somsri", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, login) = call(
        &h.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"username": "somsri", "password": "correct horse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user"]["role"], "manager");
    let token = login["token"].as_str().unwrap_or_default().to_string();

    let (status, me) = call(&h.app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "somsri");

    let (status, _) = call(&h.app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&h.app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn system_routes_answer_without_credentials() {
    let h = harness().await;
    let (status, health) = call(&h.app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");

    let (status, banner) = call(&h.app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(banner["service"], "stockroom");
}

#[tokio::test]
async fn slow_requests_hit_the_deadline() {
    use axum::routing::get;
    use stockroom::api::middleware::request_deadline;

    let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());
    let identity: Arc<dyn IdentityGate> =
        Arc::new(SessionGate::new(chrono::Duration::minutes(1)));
    let state = AppState::new(store, identity, 5, Duration::from_millis(50));
    let app: Router = Router::new()
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            request_deadline,
        ))
        .with_state(state);

    let (status, body) = call(&app, Method::GET, "/slow", None, None).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body["error"]["kind"], "timeout");
}
