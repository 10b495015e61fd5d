//! WebSocket message dispatch
//!
//! Player commands map onto state operations here. Command errors go back
//! to the requester as an `error` message; everything else is delivered
//! through the connection's outbound queue by the state layer.

use crate::error::RoomError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use std::sync::Arc;

fn error_reply(result: Result<(), RoomError>) -> Option<ServerMessage> {
    match result {
        Ok(()) => None,
        Err(e) => Some(ServerMessage::Error {
            code: e.code().to_string(),
            msg: e.to_string(),
        }),
    }
}

/// Handle a client message and return an optional direct response
pub async fn handle_message(
    msg: ClientMessage,
    conn_id: &str,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::CreateRoom { display_name } => {
            error_reply(state.create_room(conn_id, &display_name).await.map(|_| ()))
        }

        ClientMessage::Join {
            display_name,
            room_code,
        } => error_reply(state.join_room(conn_id, &room_code, &display_name).await),

        ClientMessage::RejoinRoom {
            display_name,
            room_code,
        } => error_reply(state.rejoin_room(conn_id, &room_code, &display_name).await),

        ClientMessage::UpdateSettings { settings } => {
            error_reply(state.update_settings(conn_id, &settings).await)
        }

        ClientMessage::StartRound => error_reply(state.start_round(conn_id).await),

        ClientMessage::SubmitAnswer { text } => {
            state.submit_answer(conn_id, text).await;
            None
        }

        ClientMessage::SubmitVote { accused } => {
            state.submit_vote(conn_id, accused).await;
            None
        }
    }
}
