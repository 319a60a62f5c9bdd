//! Inbound message state machine.
//!
//! Each connection starts unauthenticated and becomes authenticated when an
//! `auth` message installs a session. Mutating message types are deliberately
//! not gated on authentication; the trust boundary for this deployment is the
//! network, not the socket (see DESIGN.md).
//!
//! The `apply_*` functions are the single mutation path shared with the HTTP
//! gateway, so API-originated and socket-originated changes are
//! indistinguishable to observers.

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cache::CollectionKind;
use crate::session::{Role, Session};
use crate::state::AppState;
use crate::ws::broadcast::{broadcast_to_all, send_to_connection};
use crate::ws::{ConnectionId, ConnectionSender};

/// Inbound frame: `{type, data?, userType?, userName?}`.
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Option<Value>,
    #[serde(rename = "userType")]
    pub user_type: Option<String>,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
}

/// Outbound frame: `{type, data?}`.
#[derive(Debug, Serialize)]
pub struct ServerMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ServerMessage {
    pub fn new(kind: &'static str, data: Value) -> Self {
        Self {
            kind,
            data: Some(data),
        }
    }

    /// A data-less notice such as `cache_cleared`.
    pub fn notice(kind: &'static str) -> Self {
        Self { kind, data: None }
    }

    pub fn to_frame(&self) -> Option<Message> {
        serde_json::to_string(self)
            .ok()
            .map(|text| Message::Text(text.into()))
    }
}

/// Handle one inbound text frame. A frame that does not parse is reported
/// back to the sender only; the connection stays open.
pub fn handle_text_message(
    text: &str,
    conn_id: ConnectionId,
    tx: &ConnectionSender,
    state: &AppState,
) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(conn_id, error = %e, "Failed to parse client message");
            send_error(tx, "Invalid message format");
            return;
        }
    };

    dispatch(message, conn_id, tx, state);
}

fn dispatch(message: ClientMessage, conn_id: ConnectionId, tx: &ConnectionSender, state: &AppState) {
    match message.kind.as_str() {
        "auth" => handle_auth(message, conn_id, tx, state),
        "stock_update" => match message.data.and_then(into_array) {
            Some(records) => apply_stock_replace(state, records),
            None => send_error(tx, "stock_update requires an array payload"),
        },
        "sale_update" => match message.data {
            Some(record) => apply_sale_update(state, record),
            None => send_error(tx, "sale_update requires a payload"),
        },
        "transaction_update" => match message.data {
            Some(record) => apply_transaction_update(state, record),
            None => send_error(tx, "transaction_update requires a payload"),
        },
        "audit_update" => match message.data {
            Some(record) => apply_audit_update(state, record),
            None => send_error(tx, "audit_update requires a payload"),
        },
        "sync_request" => send_snapshot(tx, state),
        "sync_response" => {
            if let Some(data) = message.data {
                state.cache.merge(&data);
            }
        }
        other => {
            tracing::debug!(conn_id, msg_type = other, "Ignoring unrecognized message type");
        }
    }
}

/// `auth`: install or overwrite the session for this connection, then reply
/// privately with a full snapshot so the client starts from current state.
fn handle_auth(message: ClientMessage, conn_id: ConnectionId, tx: &ConnectionSender, state: &AppState) {
    let (Some(user_type), Some(user_name)) = (message.user_type, message.user_name) else {
        send_error(tx, "auth requires userType and userName");
        return;
    };

    let session = Session {
        role: Role::parse(&user_type),
        name: user_name,
    };
    tracing::info!(conn_id, role = session.role.as_str(), name = %session.name, "Connection authenticated");
    state.sessions.insert(conn_id, session);

    send_snapshot(tx, state);
}

/// Replace the stock collection and fan the new collection out.
pub fn apply_stock_replace(state: &AppState, records: Vec<Value>) {
    state.cache.replace_all(CollectionKind::Stock, records);
    broadcast_collection(state, "stock_update", CollectionKind::Stock);
}

/// Append one stock record (HTTP gateway path) and fan the collection out.
pub fn apply_stock_append(state: &AppState, record: Value) {
    state.cache.append(CollectionKind::Stock, record);
    broadcast_collection(state, "stock_update", CollectionKind::Stock);
}

/// Append a sale, broadcast the sales collection, decrement stock for any
/// line items, then record and broadcast the audit trail.
pub fn apply_sale_update(state: &AppState, record: Value) {
    let stored = state.cache.append(CollectionKind::Sales, record);
    broadcast_collection(state, "sale_update", CollectionKind::Sales);

    if let Some(items) = stored.get("items").and_then(Value::as_array) {
        for item in items {
            if let Some(id) = item.get("id") {
                let quantity = item.get("quantity").and_then(Value::as_f64).unwrap_or(1.0);
                state.cache.adjust_stock(id, quantity);
            }
        }
    }

    apply_audit_update(state, json!({"action": "sale_recorded", "details": stored}));
}

/// Append a transaction, broadcast it, then record a matching audit entry.
pub fn apply_transaction_update(state: &AppState, record: Value) {
    let stored = state.cache.append(CollectionKind::Transactions, record);
    broadcast_collection(state, "transaction_update", CollectionKind::Transactions);

    apply_audit_update(state, json!({"action": "transaction_recorded", "details": stored}));
}

/// Append an audit entry and broadcast the updated audit collection.
pub fn apply_audit_update(state: &AppState, record: Value) {
    state.cache.append(CollectionKind::Audit, record);
    broadcast_collection(state, "audit_update", CollectionKind::Audit);
}

/// Broadcast the current contents of one collection under the given type.
fn broadcast_collection(state: &AppState, kind: &'static str, collection: CollectionKind) {
    let message = ServerMessage::new(kind, Value::Array(state.cache.get(collection)));
    broadcast_to_all(&state.connections, &message);
}

/// Private full-snapshot reply, used for `sync_request` and the `auth` ack.
fn send_snapshot(tx: &ConnectionSender, state: &AppState) {
    let snapshot = serde_json::to_value(state.cache.snapshot()).unwrap_or_default();
    send_to_connection(tx, &ServerMessage::new("sync_response", snapshot));
}

fn send_error(tx: &ConnectionSender, message: &str) {
    send_to_connection(
        tx,
        &ServerMessage::new("error", json!({ "message": message })),
    );
}

fn into_array(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(records) => Some(records),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BusinessSettings;
    use tokio::sync::mpsc;

    fn test_state() -> AppState {
        AppState::new(BusinessSettings::default())
    }

    fn attach_client(state: &AppState) -> (ConnectionId, mpsc::UnboundedReceiver<Message>) {
        let conn_id = crate::ws::next_connection_id();
        let (tx, rx) = mpsc::unbounded_channel();
        state.connections.insert(conn_id, tx);
        (conn_id, rx)
    }

    fn recv_json(rx: &mut mpsc::UnboundedReceiver<Message>) -> Value {
        match rx.try_recv().expect("expected a frame") {
            Message::Text(text) => serde_json::from_str(text.as_str()).expect("valid JSON frame"),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[test]
    fn malformed_frame_reports_error_to_sender_only() {
        let state = test_state();
        let (conn_id, mut rx) = attach_client(&state);
        let (_other_id, mut other_rx) = attach_client(&state);
        let tx = state.connections.get(&conn_id).unwrap().value().clone();

        handle_text_message("this is not json", conn_id, &tx, &state);

        let frame = recv_json(&mut rx);
        assert_eq!(frame["type"], "error");
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn auth_installs_session_and_replies_with_snapshot() {
        let state = test_state();
        let (conn_id, mut rx) = attach_client(&state);
        let tx = state.connections.get(&conn_id).unwrap().value().clone();

        handle_text_message(
            r#"{"type":"auth","userType":"admin","userName":"Alice"}"#,
            conn_id,
            &tx,
            &state,
        );

        let session = state.sessions.get(&conn_id).expect("session installed");
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.name, "Alice");

        let frame = recv_json(&mut rx);
        assert_eq!(frame["type"], "sync_response");
        assert!(frame["data"]["stock"].is_array());
    }

    #[test]
    fn auth_without_identity_is_rejected() {
        let state = test_state();
        let (conn_id, mut rx) = attach_client(&state);
        let tx = state.connections.get(&conn_id).unwrap().value().clone();

        handle_text_message(r#"{"type":"auth"}"#, conn_id, &tx, &state);

        assert!(state.sessions.get(&conn_id).is_none());
        assert_eq!(recv_json(&mut rx)["type"], "error");
    }

    #[test]
    fn sale_update_adjusts_stock_and_writes_audit_trail() {
        let state = test_state();
        state.cache.replace_all(
            CollectionKind::Stock,
            vec![json!({"id": 1, "name": "Milk", "quantity": 10})],
        );
        let (_conn_id, mut rx) = attach_client(&state);

        apply_sale_update(
            &state,
            json!({"total": 12.5, "items": [{"id": 1, "quantity": 4}]}),
        );

        // Sender sees the sale broadcast first, then the audit broadcast.
        assert_eq!(recv_json(&mut rx)["type"], "sale_update");
        assert_eq!(recv_json(&mut rx)["type"], "audit_update");

        assert_eq!(state.cache.get(CollectionKind::Stock)[0]["quantity"], 6);
        let audit = state.cache.get(CollectionKind::Audit);
        assert_eq!(audit[0]["action"], "sale_recorded");
        assert!(audit[0]["timestamp"].is_string());
    }

    #[test]
    fn unknown_message_type_is_ignored() {
        let state = test_state();
        let (conn_id, mut rx) = attach_client(&state);
        let tx = state.connections.get(&conn_id).unwrap().value().clone();

        handle_text_message(r#"{"type":"reboot_terminal"}"#, conn_id, &tx, &state);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sync_response_merges_without_broadcast() {
        let state = test_state();
        let (conn_id, mut rx) = attach_client(&state);
        let tx = state.connections.get(&conn_id).unwrap().value().clone();

        handle_text_message(
            r#"{"type":"sync_response","data":{"stock":[{"id":9,"quantity":1}]}}"#,
            conn_id,
            &tx,
            &state,
        );

        assert_eq!(state.cache.get(CollectionKind::Stock).len(), 1);
        assert!(rx.try_recv().is_err());
    }
}
