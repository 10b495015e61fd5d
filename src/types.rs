use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Connection identifier (volatile across reconnects)
pub type ConnId = String;
/// Short human-typable room code
pub type RoomCode = String;

/// Minimum players required to start a round
pub const MIN_PLAYERS: usize = 3;

/// Tally bucket for ballots that accuse nobody
pub const NO_ACCUSATION: &str = "(no accusation)";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImpostorMode {
    /// Exactly one impostor per round
    One,
    /// A random impostor count per round (may be zero)
    Variable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSettings {
    pub impostor_mode: ImpostorMode,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            impostor_mode: ImpostorMode::Variable,
        }
    }
}

/// Partial settings update sent by the host; absent fields leave the current
/// value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub impostor_mode: Option<ImpostorMode>,
}

impl RoomSettings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(mode) = patch.impostor_mode {
            self.impostor_mode = mode;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    Idle,
    RoleAssignment,
    PromptDispatch,
    AnswerCollection,
    RevealAnswers,
    VoteCollection,
    ScoreReveal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: ConnId,
    pub name: String,
}

/// An answer submitted for the active round, tagged with the submitter's
/// display name so reveals don't need a membership lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub name: String,
    pub text: String,
}

/// One game session. Mutated strictly sequentially through the registry lock.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    pub host_id: ConnId,
    /// Insertion order = join order (host promotion picks the earliest)
    pub players: Vec<Player>,
    pub settings: RoomSettings,
    pub phase: RoundPhase,
    /// Base prompt of the active round, empty before the first round
    pub current_prompt: String,
    /// Display names holding the impostor role in the most recent round
    pub last_impostors: HashSet<String>,
    /// Keyed by connection id
    pub answers: HashMap<ConnId, Answer>,
    /// Keyed by display name; an empty list is an abstention
    pub votes: HashMap<String, Vec<String>>,
    /// Cumulative totals, keyed by connection id, for the room's lifetime
    pub scores: HashMap<ConnId, i32>,
    /// Set when the last player leaves; the reaper deletes the room once the
    /// grace window has passed
    pub emptied_at: Option<DateTime<Utc>>,
}

impl Room {
    pub fn new(code: RoomCode, host: Player) -> Self {
        Self {
            code,
            host_id: host.id.clone(),
            players: vec![host],
            settings: RoomSettings::default(),
            phase: RoundPhase::Idle,
            current_prompt: String::new(),
            last_impostors: HashSet::new(),
            answers: HashMap::new(),
            votes: HashMap::new(),
            scores: HashMap::new(),
            emptied_at: None,
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn is_host(&self, id: &str) -> bool {
        self.host_id == id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RoomSettings::default();
        assert_eq!(settings.impostor_mode, ImpostorMode::Variable);
    }

    #[test]
    fn test_settings_patch_merges_only_present_fields() {
        let mut settings = RoomSettings::default();
        settings.apply(&SettingsPatch { impostor_mode: None });
        assert_eq!(settings.impostor_mode, ImpostorMode::Variable);

        settings.apply(&SettingsPatch {
            impostor_mode: Some(ImpostorMode::One),
        });
        assert_eq!(settings.impostor_mode, ImpostorMode::One);
    }

    #[test]
    fn test_player_lookup_by_name_is_case_insensitive() {
        let room = Room::new(
            "ABC123".to_string(),
            Player {
                id: "conn1".to_string(),
                name: "Alice".to_string(),
            },
        );
        assert!(room.player_by_name("alice").is_some());
        assert!(room.player_by_name("ALICE").is_some());
        assert!(room.player_by_name("Bob").is_none());
    }
}
