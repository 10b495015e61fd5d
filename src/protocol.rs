use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        display_name: String,
    },
    Join {
        display_name: String,
        room_code: RoomCode,
    },
    /// Rebind an existing player record to this connection after a reconnect
    RejoinRoom {
        display_name: String,
        room_code: RoomCode,
    },
    /// Host-only: merge recognized options into the room settings
    UpdateSettings {
        settings: SettingsPatch,
    },
    /// Host-only
    StartRound,
    SubmitAnswer {
        text: String,
    },
    /// An empty (or absent) accusation list is an abstention
    SubmitVote {
        #[serde(default)]
        accused: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    RoomCreated {
        room_code: RoomCode,
        players: Vec<Player>,
        settings: RoomSettings,
    },
    HostAssigned {
        message: String,
    },
    JoinedRoom {
        room_code: RoomCode,
        players: Vec<Player>,
        settings: RoomSettings,
    },
    UpdatePlayers {
        players: Vec<Player>,
    },
    SettingsUpdated {
        settings: RoomSettings,
    },
    /// Delivered privately, exactly once per player per round
    Prompt {
        text: String,
    },
    /// Broadcast once all answers are in; answers are not matched to roles
    RevealAnswers {
        answers: Vec<Answer>,
        question: String,
    },
    /// Broadcast once all votes are in
    VoteResults {
        question: String,
        votes_by_player: HashMap<String, Vec<String>>,
        top_voted: HashSet<String>,
        impostors: HashSet<String>,
        tally: HashMap<String, u32>,
    },
    /// Follows vote_results; both maps are keyed by display name
    ScoreUpdate {
        totals: HashMap<String, i32>,
        deltas: HashMap<String, i32>,
    },
    Error {
        code: String,
        msg: String,
    },
}
