use axum::{
    http::StatusCode,
    routing::{any, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::api::{admin, auth, records, settings};
use crate::state::AppState;
use crate::ws::handler as ws_handler;

/// Build the full axum Router: JSON API, WebSocket upgrade, and static asset
/// fallback. All responses carry permissive CORS headers; preflight OPTIONS
/// is answered by the CORS layer with headers only.
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/stock",
            get(records::get_stock).post(records::post_stock),
        )
        .route(
            "/api/sales",
            get(records::get_sales).post(records::post_sales),
        )
        .route(
            "/api/audit",
            get(records::get_audit).post(records::post_audit),
        )
        .route("/api/settings", get(settings::get_settings))
        .route("/api/login", post(auth::login))
        .route("/api/health", get(admin::health))
        .route("/api/clear-cache", post(admin::clear_cache))
        // Unmatched API paths get a JSON 404 instead of the static fallback.
        .route("/api/{*rest}", any(api_not_found));

    let ws_routes = Router::new().route("/ws", get(ws_handler::ws_upgrade));

    Router::new()
        .merge(api_routes)
        .merge(ws_routes)
        // Any non-API, non-upgrade path is served from the asset directory.
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// JSON not-found response for unknown /api paths.
async fn api_not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Not found" })),
    )
}
