use std::sync::Arc;

use crate::cache::SharedCache;
use crate::config::BusinessSettings;
use crate::session::SessionMap;
use crate::ws::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// The single writable copy of stock/sales/transactions/audit data.
    pub cache: Arc<SharedCache>,
    /// Active WebSocket connections, keyed by connection id.
    pub connections: ConnectionRegistry,
    /// Per-connection authenticated sessions (may lag behind `connections`).
    pub sessions: SessionMap,
    /// Static business thresholds served by GET /api/settings.
    pub settings: BusinessSettings,
}

impl AppState {
    pub fn new(settings: BusinessSettings) -> Self {
        Self {
            cache: Arc::new(SharedCache::new()),
            connections: crate::ws::new_connection_registry(),
            sessions: crate::session::new_session_map(),
            settings,
        }
    }
}
