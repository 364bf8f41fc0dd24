//! In-process realtime hub.
//!
//! Events fan out over tokio broadcast channels: one global channel every
//! connected client receives, plus per-user rooms for targeted pushes.
//! Delivery is best effort; a client with no live connection simply misses
//! the push and catches up from the durable notification rows.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

/// One pushed event: channel name plus JSON payload.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub event: String,
    pub data: serde_json::Value,
}

#[derive(Clone)]
pub struct RealtimeHub {
    global: broadcast::Sender<Envelope>,
    rooms: Arc<RwLock<HashMap<Uuid, broadcast::Sender<Envelope>>>>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (global, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            global,
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Subscribe to events addressed to everyone.
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.global.subscribe()
    }

    /// Subscribe to events addressed to one user, creating the room on
    /// first use.
    pub async fn subscribe_user(&self, usuario_id: Uuid) -> broadcast::Receiver<Envelope> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(usuario_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Push an event to every connected client. Returns how many receivers
    /// got it.
    pub fn emit(&self, event: &str, data: serde_json::Value) -> usize {
        self.global
            .send(Envelope {
                event: event.to_string(),
                data,
            })
            .unwrap_or(0)
    }

    /// Push an event to one user's connections, dropping the room when
    /// nobody is listening anymore.
    pub async fn emit_to_user(&self, usuario_id: Uuid, event: &str, data: serde_json::Value) {
        let mut rooms = self.rooms.write().await;
        if let Some(sender) = rooms.get(&usuario_id) {
            let delivered = sender
                .send(Envelope {
                    event: event.to_string(),
                    data,
                })
                .unwrap_or(0);
            if delivered == 0 && sender.receiver_count() == 0 {
                rooms.remove(&usuario_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_global_broadcast_reaches_all_subscribers() {
        let hub = RealtimeHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        let delivered = hub.emit("chamado:created", json!({"codigo": "EVQ-0081"}));
        assert_eq!(delivered, 2);

        let envelope = a.recv().await.unwrap();
        assert_eq!(envelope.event, "chamado:created");
        assert_eq!(envelope.data["codigo"], "EVQ-0081");
        assert_eq!(b.recv().await.unwrap().event, "chamado:created");
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_is_noop() {
        let hub = RealtimeHub::new();
        assert_eq!(hub.emit("chamado:deleted", json!({})), 0);
    }

    #[tokio::test]
    async fn test_user_room_is_isolated() {
        let hub = RealtimeHub::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut alice_rx = hub.subscribe_user(alice).await;
        let mut bob_rx = hub.subscribe_user(bob).await;

        hub.emit_to_user(alice, "notification:new", json!({"titulo": "oi"}))
            .await;

        assert_eq!(alice_rx.recv().await.unwrap().event, "notification:new");
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dead_room_is_pruned() {
        let hub = RealtimeHub::new();
        let user = Uuid::new_v4();
        let rx = hub.subscribe_user(user).await;
        drop(rx);

        hub.emit_to_user(user, "notification:new", json!({})).await;
        assert!(hub.rooms.read().await.is_empty());
    }
}
