mod membership;
mod room;
mod round;
pub mod score;

use crate::prompt::{PromptProvider, StaticPrompts};
use crate::protocol::ServerMessage;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

/// Shared application state: the room registry plus the transport-facing
/// connection registry. One instance per process, injected into the router
/// and the socket tasks rather than living in a module global.
#[derive(Clone)]
pub struct AppState {
    /// Room registry, keyed by room code. All room mutation goes through
    /// this lock, which serializes actions on any one room.
    pub rooms: Arc<RwLock<HashMap<RoomCode, Room>>>,
    /// Connection-to-room binding, established by create/join/rejoin
    pub bindings: Arc<RwLock<HashMap<ConnId, RoomCode>>>,
    /// Outbound queues, one per live connection
    pub connections: Arc<RwLock<HashMap<ConnId, mpsc::UnboundedSender<ServerMessage>>>>,
    pub prompts: Arc<dyn PromptProvider>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_provider(Arc::new(StaticPrompts))
    }

    pub fn with_provider(prompts: Arc<dyn PromptProvider>) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            bindings: Arc::new(RwLock::new(HashMap::new())),
            connections: Arc::new(RwLock::new(HashMap::new())),
            prompts,
        }
    }

    pub async fn register_connection(
        &self,
        conn_id: &str,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) {
        self.connections
            .write()
            .await
            .insert(conn_id.to_string(), tx);
    }

    pub async fn unregister_connection(&self, conn_id: &str) {
        self.connections.write().await.remove(conn_id);
    }

    /// Deliver a message to one connection. Dead or unknown connections are
    /// ignored; delivery failure never surfaces to other players.
    pub async fn send_to(&self, conn_id: &str, msg: ServerMessage) {
        if let Some(tx) = self.connections.read().await.get(conn_id) {
            let _ = tx.send(msg);
        }
    }

    /// Deliver a message to every player currently in the room
    pub async fn broadcast_room(&self, room: &Room, msg: ServerMessage) {
        let connections = self.connections.read().await;
        for player in &room.players {
            if let Some(tx) = connections.get(&player.id) {
                let _ = tx.send(msg.clone());
            }
        }
    }

    /// Room code the connection is currently bound to, if any
    pub async fn room_of(&self, conn_id: &str) -> Option<RoomCode> {
        self.bindings.read().await.get(conn_id).cloned()
    }

    /// Snapshot of a room (for tests and diagnostics)
    pub async fn get_room(&self, code: &str) -> Option<Room> {
        self.rooms.read().await.get(code).cloned()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
