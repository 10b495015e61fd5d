use super::round::{resolve_votes_if_complete, reveal_if_complete};
use super::AppState;
use crate::error::RoomError;
use crate::protocol::ServerMessage;
use crate::types::*;

impl AppState {
    /// Add a player to an existing room
    pub async fn join_room(
        &self,
        conn_id: &str,
        code: &str,
        display_name: &str,
    ) -> Result<(), RoomError> {
        let name = display_name.trim();
        if name.is_empty() {
            return Err(RoomError::InvalidName);
        }

        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;

        if room.player_by_name(name).is_some() {
            return Err(RoomError::NameTaken);
        }

        room.players.push(Player {
            id: conn_id.to_string(),
            name: name.to_string(),
        });

        // A join during the empty-room grace window revives the room; the
        // newcomer becomes host since the old host id no longer resolves.
        let mut host_granted = false;
        if room.emptied_at.take().is_some() || room.player(&room.host_id).is_none() {
            room.host_id = conn_id.to_string();
            host_granted = true;
        }

        let room = room.clone();
        drop(rooms);

        self.bindings
            .write()
            .await
            .insert(conn_id.to_string(), code.to_string());

        self.send_to(
            conn_id,
            ServerMessage::JoinedRoom {
                room_code: room.code.clone(),
                players: room.players.clone(),
                settings: room.settings.clone(),
            },
        )
        .await;
        if host_granted {
            self.send_to(
                conn_id,
                ServerMessage::HostAssigned {
                    message: format!("You are now the host of room {}", room.code),
                },
            )
            .await;
        }
        self.broadcast_room(
            &room,
            ServerMessage::UpdatePlayers {
                players: room.players.clone(),
            },
        )
        .await;

        tracing::info!("{} joined room {}", name, code);
        Ok(())
    }

    /// Rebind an existing player record to a fresh connection id, keeping
    /// score and pending answer. Host status follows the record.
    pub async fn rejoin_room(
        &self,
        conn_id: &str,
        code: &str,
        display_name: &str,
    ) -> Result<(), RoomError> {
        let mut rooms = self.rooms.write().await;
        let room = rooms.get_mut(code).ok_or(RoomError::RoomNotFound)?;

        let name = display_name.trim();
        let player = room
            .players
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or(RoomError::PlayerNotFound)?;
        let old_id = std::mem::replace(&mut player.id, conn_id.to_string());

        if let Some(answer) = room.answers.remove(&old_id) {
            room.answers.insert(conn_id.to_string(), answer);
        }
        if let Some(score) = room.scores.remove(&old_id) {
            room.scores.insert(conn_id.to_string(), score);
        }

        let host_regranted = room.host_id == old_id;
        if host_regranted {
            room.host_id = conn_id.to_string();
        }

        let room = room.clone();
        drop(rooms);

        let mut bindings = self.bindings.write().await;
        bindings.remove(&old_id);
        bindings.insert(conn_id.to_string(), code.to_string());
        drop(bindings);

        self.send_to(
            conn_id,
            ServerMessage::JoinedRoom {
                room_code: room.code.clone(),
                players: room.players.clone(),
                settings: room.settings.clone(),
            },
        )
        .await;
        if host_regranted {
            self.send_to(
                conn_id,
                ServerMessage::HostAssigned {
                    message: format!("You are now the host of room {}", room.code),
                },
            )
            .await;
        }
        self.broadcast_room(
            &room,
            ServerMessage::UpdatePlayers {
                players: room.players.clone(),
            },
        )
        .await;

        tracing::info!("{} rejoined room {}", display_name, code);
        Ok(())
    }

    /// Transport disconnect notice. Removes the player and their pending
    /// round data, hands the host role to the earliest-joined survivor, and
    /// re-checks phase completion so a round never stalls on a ghost. A
    /// disconnect for an already-deleted room is a silent no-op.
    pub async fn handle_disconnect(&self, conn_id: &str) {
        let code = match self.bindings.write().await.remove(conn_id) {
            Some(code) => code,
            None => return,
        };

        let mut rooms = self.rooms.write().await;
        let room = match rooms.get_mut(&code) {
            Some(room) => room,
            None => return,
        };

        let departed = match room.player(conn_id) {
            Some(player) => player.name.clone(),
            None => return,
        };
        room.players.retain(|p| p.id != conn_id);
        room.answers.remove(conn_id);
        room.votes.remove(&departed);
        room.scores.remove(conn_id);

        tracing::info!("{} left room {}", departed, code);

        if room.players.is_empty() {
            room.emptied_at = Some(chrono::Utc::now());
            return;
        }

        let mut host_assigned_to = None;
        if room.host_id == conn_id {
            room.host_id = room.players[0].id.clone();
            host_assigned_to = Some(room.host_id.clone());
            tracing::info!("New host in {}: {}", code, room.players[0].name);
        }

        // The departed player no longer counts toward completion thresholds
        let reveal = reveal_if_complete(room);
        let resolution = resolve_votes_if_complete(room);

        let room = room.clone();
        drop(rooms);

        if let Some(new_host) = host_assigned_to {
            self.send_to(
                &new_host,
                ServerMessage::HostAssigned {
                    message: format!("You are now the host of room {}", code),
                },
            )
            .await;
        }
        self.broadcast_room(
            &room,
            ServerMessage::UpdatePlayers {
                players: room.players.clone(),
            },
        )
        .await;
        if let Some(msg) = reveal {
            self.broadcast_room(&room, msg).await;
        }
        if let Some((results, scores)) = resolution {
            self.broadcast_room(&room, results).await;
            self.broadcast_room(&room, scores).await;
        }
    }
}
