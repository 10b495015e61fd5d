use super::AppState;
use crate::error::RoomError;
use crate::protocol::ServerMessage;
use crate::types::*;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

/// Safe character set for room codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;

/// How long an emptied room survives before the reaper deletes it,
/// tolerating quick reconnects
pub const EMPTY_ROOM_GRACE: Duration = Duration::from_secs(10);

fn generate_room_code() -> RoomCode {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

impl AppState {
    /// Create a room with the creator as sole player and host
    pub async fn create_room(
        &self,
        conn_id: &str,
        display_name: &str,
    ) -> Result<RoomCode, RoomError> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(RoomError::InvalidName);
        }

        let mut rooms = self.rooms.write().await;

        // Collision-checked against live rooms (rare with 31^6 codes)
        let code = loop {
            let code = generate_room_code();
            if !rooms.contains_key(&code) {
                break code;
            }
        };

        let room = Room::new(
            code.clone(),
            Player {
                id: conn_id.to_string(),
                name: name.to_string(),
            },
        );
        rooms.insert(code.clone(), room.clone());
        drop(rooms);

        self.bindings
            .write()
            .await
            .insert(conn_id.to_string(), code.clone());

        self.send_to(
            conn_id,
            ServerMessage::RoomCreated {
                room_code: code.clone(),
                players: room.players.clone(),
                settings: room.settings.clone(),
            },
        )
        .await;
        self.send_to(
            conn_id,
            ServerMessage::HostAssigned {
                message: format!("You are the host of room {}", code),
            },
        )
        .await;
        self.broadcast_room(
            &room,
            ServerMessage::UpdatePlayers {
                players: room.players.clone(),
            },
        )
        .await;

        tracing::info!("Room created: {} | host: {}", code, name);
        Ok(code)
    }

    /// Host-only settings merge
    pub async fn update_settings(
        &self,
        conn_id: &str,
        patch: &SettingsPatch,
    ) -> Result<(), RoomError> {
        let code = match self.room_of(conn_id).await {
            Some(code) => code,
            None => return Ok(()), // vanished room: silent no-op
        };

        let mut rooms = self.rooms.write().await;
        let room = match rooms.get_mut(&code) {
            Some(room) => room,
            None => return Ok(()),
        };
        if !room.is_host(conn_id) {
            return Err(RoomError::NotAuthorized);
        }

        room.settings.apply(patch);
        let room = room.clone();
        drop(rooms);

        self.broadcast_room(
            &room,
            ServerMessage::SettingsUpdated {
                settings: room.settings.clone(),
            },
        )
        .await;
        Ok(())
    }

    /// Delete rooms that have sat empty past the grace window. Returns the
    /// codes that were removed.
    pub async fn reap_empty_rooms(&self, now: DateTime<Utc>) -> Vec<RoomCode> {
        let mut rooms = self.rooms.write().await;
        let expired: Vec<RoomCode> = rooms
            .iter()
            .filter(|(_, room)| {
                room.players.is_empty()
                    && room
                        .emptied_at
                        .map(|at| (now - at).to_std().is_ok_and(|d| d >= EMPTY_ROOM_GRACE))
                        .unwrap_or(false)
            })
            .map(|(code, _)| code.clone())
            .collect();

        for code in &expired {
            rooms.remove(code);
            tracing::info!("Room {} deleted (empty past grace window)", code);
        }
        expired
    }
}
