//! Resource handlers for the three client-writable collections.
//!
//! POST handlers go through the same `apply_*` path as the corresponding
//! WebSocket message, so an HTTP mutation and a socket mutation are
//! observationally identical to every connected client.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::cache::CollectionKind;
use crate::state::AppState;
use crate::ws::protocol;

/// GET /api/stock
pub async fn get_stock(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.cache.get(CollectionKind::Stock))
}

/// GET /api/sales
pub async fn get_sales(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.cache.get(CollectionKind::Sales))
}

/// GET /api/audit
pub async fn get_audit(State(state): State<AppState>) -> Json<Vec<Value>> {
    Json(state.cache.get(CollectionKind::Audit))
}

/// POST /api/stock — append one stock record and fan the collection out.
pub async fn post_stock(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    protocol::apply_stock_append(&state, body);
    Json(json!({ "success": true }))
}

/// POST /api/sales — same path as the `sale_update` WebSocket message,
/// including stock adjustment and the audit trail.
pub async fn post_sales(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    protocol::apply_sale_update(&state, body);
    Json(json!({ "success": true }))
}

/// POST /api/audit
pub async fn post_audit(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Value> {
    protocol::apply_audit_update(&state, body);
    Json(json!({ "success": true }))
}
