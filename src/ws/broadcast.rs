//! Fan-out delivery to every open connection.
//!
//! Delivery is best-effort and fire-and-forget: a send to a connection whose
//! actor has gone away simply fails and is skipped. Cleanup of dead entries
//! happens in the owning actor's teardown path, never while iterating the
//! registry here.

use super::{ConnectionRegistry, ConnectionSender};
use crate::ws::protocol::ServerMessage;

/// Broadcast a message to all registered connections. The frame is
/// serialized once and cloned per recipient.
pub fn broadcast_to_all(registry: &ConnectionRegistry, message: &ServerMessage) {
    let Some(frame) = message.to_frame() else {
        return;
    };

    for entry in registry.iter() {
        let _ = entry.value().send(frame.clone());
    }
}

/// Send a message to a single connection (private replies).
pub fn send_to_connection(tx: &ConnectionSender, message: &ServerMessage) {
    if let Some(frame) = message.to_frame() {
        let _ = tx.send(frame);
    }
}
