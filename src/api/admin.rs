//! Operational endpoints: health probe and cache reset.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

use crate::cache::CacheSizes;
use crate::state::AppState;
use crate::ws::broadcast::broadcast_to_all;
use crate::ws::protocol::ServerMessage;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub connections: usize,
    #[serde(rename = "cacheSizes")]
    pub cache_sizes: CacheSizes,
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: state.connections.len(),
        cache_sizes: state.cache.sizes(),
    })
}

/// POST /api/clear-cache — empty all four collections and tell every
/// connected client to drop its local view.
pub async fn clear_cache(State(state): State<AppState>) -> Json<Value> {
    state.cache.clear();
    broadcast_to_all(&state.connections, &ServerMessage::notice("cache_cleared"));

    tracing::info!("Cache cleared by API request");
    Json(json!({ "success": true, "message": "Cache cleared" }))
}
