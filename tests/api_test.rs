//! Integration tests for the HTTP API gateway: resource round-trips, login,
//! settings, health, CORS, and the JSON not-found fallback.

use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use tillsync_server::api::routes::build_router;
use tillsync_server::config::BusinessSettings;
use tillsync_server::state::AppState;

/// Start the real router on a random port and return (base_url, addr).
async fn start_test_server() -> (String, SocketAddr) {
    let state = AppState::new(BusinessSettings::default());
    let app = build_router(state, "./public");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), addr)
}

#[tokio::test]
async fn test_stock_post_then_get_roundtrip() {
    let (base_url, _addr) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/stock", base_url))
        .json(&json!({"id": 1, "name": "Milk", "quantity": 12}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let stock: Vec<Value> = client
        .get(format!("{}/api/stock", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stock.len(), 1);
    assert_eq!(stock[0]["name"], "Milk");
    // Stock records are not timestamped by the server.
    assert!(stock[0].get("timestamp").is_none());
}

#[tokio::test]
async fn test_sales_post_stamps_timestamp_and_writes_audit() {
    let (base_url, _addr) = start_test_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/sales", base_url))
        .json(&json!({"total": 25.0, "cashier": "till-1"}))
        .send()
        .await
        .unwrap();

    let sales: Vec<Value> = client
        .get(format!("{}/api/sales", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);
    assert!(sales[0]["timestamp"].is_string());

    // The sale left an audit trail behind it.
    let audit: Vec<Value> = client
        .get(format!("{}/api/audit", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0]["action"], "sale_recorded");
}

#[tokio::test]
async fn test_login_accepts_fixed_credentials() {
    let (base_url, _addr) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/login", base_url))
        .json(&json!({"loginType": "admin", "password": "admin123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["userType"], "admin");
    assert_eq!(body["userName"], "Administrator");

    let resp = client
        .post(format!("{}/api/login", base_url))
        .json(&json!({"loginType": "user", "password": "user123"}))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["userType"], "user");
    assert_eq!(body["userName"], "Cashier");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (base_url, _addr) = start_test_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/login", base_url))
        .json(&json!({"loginType": "admin", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_settings_returns_thresholds() {
    let (base_url, _addr) = start_test_server().await;

    let body: Value = reqwest::Client::new()
        .get(format!("{}/api/settings", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["lowStockThreshold"], 5);
    assert!(body["taxRate"].is_number());
    assert!(body["currency"].is_string());
}

#[tokio::test]
async fn test_health_reports_connections_and_cache_sizes() {
    let (base_url, addr) = start_test_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/api/health", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 0);
    assert_eq!(body["cacheSizes"]["stock"], 0);

    // One live WebSocket connection and a couple of records later.
    let (_ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .unwrap();
    // Registration happens in the spawned actor; give it a moment.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    client
        .post(format!("{}/api/stock", base_url))
        .json(&json!({"id": 1, "quantity": 2}))
        .send()
        .await
        .unwrap();

    let body: Value = client
        .get(format!("{}/api/health", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["connections"], 1);
    assert_eq!(body["cacheSizes"]["stock"], 1);
}

#[tokio::test]
async fn test_unknown_api_path_is_json_not_found() {
    let (base_url, _addr) = start_test_server().await;

    let resp = reqwest::Client::new()
        .get(format!("{}/api/does-not-exist", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_preflight_gets_permissive_cors_headers() {
    let (base_url, _addr) = start_test_server().await;

    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/api/stock", base_url))
        .header("Origin", "http://terminal.local")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert!(resp.status().is_success());
    assert!(resp
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_clear_cache_empties_all_collections() {
    let (base_url, _addr) = start_test_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/sales", base_url))
        .json(&json!({"total": 1.0}))
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{}/api/clear-cache", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = client
        .get(format!("{}/api/health", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    for kind in ["stock", "sales", "transactions", "audit"] {
        assert_eq!(body["cacheSizes"][kind], 0, "{kind} should be empty");
    }
}
