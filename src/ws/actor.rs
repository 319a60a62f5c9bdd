use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::state::AppState;
use crate::ws::{next_connection_id, protocol, ConnectionId};

/// Run the actor-per-connection pattern for an admitted WebSocket.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards messages from an mpsc channel
/// - Reader loop: processes incoming frames, dispatches to the protocol
///
/// The mpsc channel allows any part of the system to push messages to this
/// client by cloning the sender held in the connection registry.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let conn_id = next_connection_id();
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    // Admitted to the registry before any frame is read; the connection is
    // a broadcast recipient from this point even while unauthenticated.
    state.connections.insert(conn_id, tx.clone());
    tracing::info!(
        conn_id,
        connections = state.connections.len(),
        "WebSocket connection admitted"
    );

    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    protocol::handle_text_message(text.as_str(), conn_id, &tx, &state);
                }
                Message::Binary(_) => {
                    tracing::debug!(conn_id, "Ignoring binary frame (protocol is JSON text)");
                }
                Message::Ping(data) => {
                    // Respond to client pings with pong
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Pong(_) => {}
                Message::Close(frame) => {
                    tracing::info!(conn_id, reason = ?frame, "Client initiated close");
                    break;
                }
            },
            Some(Err(e)) => {
                tracing::warn!(conn_id, error = %e, "WebSocket receive error");
                break;
            }
            None => {
                // Stream ended — client disconnected
                tracing::info!(conn_id, "WebSocket stream ended");
                break;
            }
        }
    }

    writer_handle.abort();
    unregister_connection(&state, conn_id);
}

/// Writer task: receives messages from the mpsc channel and forwards them to
/// the WebSocket sink. One writer per connection preserves send order.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            // WebSocket send failed — connection is broken
            break;
        }
    }
}

/// Remove the connection from the registry along with any session it
/// authenticated. Safe to call for an already-removed connection.
fn unregister_connection(state: &AppState, conn_id: ConnectionId) {
    state.connections.remove(&conn_id);
    state.sessions.remove(&conn_id);

    tracing::debug!(
        conn_id,
        connections = state.connections.len(),
        "Connection unregistered"
    );
}
