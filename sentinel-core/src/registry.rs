use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::StreamMessage;

/// Capacity of each subscriber's outbound queue. A subscriber that falls this
/// far behind is treated as dead and dropped.
const CLIENT_CHANNEL_CAPACITY: usize = 64;

/// Handle returned to a newly registered subscriber: its identity plus the
/// receiving half of its outbound queue.
pub struct ClientHandle {
    pub id: Uuid,
    pub rx: mpsc::Receiver<String>,
}

/// Tracks the set of currently active stream subscribers and fans messages
/// out to all of them.
///
/// Membership lives behind a single `RwLock`; broadcast iterates over a
/// momentary copy of the set so a connection removed mid-broadcast simply
/// misses the rest of that broadcast.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<Uuid, mpsc::Sender<String>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a newly accepted subscriber to the active set.
    pub async fn register(&self) -> ClientHandle {
        let (tx, rx) = mpsc::channel(CLIENT_CHANNEL_CAPACITY);
        let id = Uuid::new_v4();

        let mut connections = self.connections.write().await;
        connections.insert(id, tx);
        info!("Client connected, total clients: {}", connections.len());

        ClientHandle { id, rx }
    }

    /// Remove a subscriber from the active set. No-op if it is already gone,
    /// so disconnect notifications and send-failure paths can both call this.
    pub async fn unregister(&self, id: Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(&id).is_some() {
            info!("Client disconnected, total clients: {}", connections.len());
        }
    }

    pub async fn client_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Deliver `message` to every subscriber in the set as of call time.
    /// Returns the number of successful deliveries.
    ///
    /// A failed delivery never aborts the broadcast: the subscriber is logged
    /// and removed, and the remaining subscribers still receive the message.
    /// An empty set is a no-op.
    pub async fn broadcast(&self, message: &StreamMessage) -> usize {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize broadcast message: {}", e);
                return 0;
            }
        };

        let targets: Vec<(Uuid, mpsc::Sender<String>)> = {
            let connections = self.connections.read().await;
            connections
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (id, tx) in targets {
            match tx.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(client_id = %id, "Subscriber queue full, dropping connection");
                    failed.push(id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            let mut connections = self.connections.write().await;
            for id in failed {
                if connections.remove(&id).is_some() {
                    info!(client_id = %id, "Removed unreachable client, total clients: {}", connections.len());
                }
            }
        }

        delivered
    }
}
