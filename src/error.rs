/// Errors reported back to the player whose command caused them. None of
/// these interrupt other players' sessions or the room itself; disconnects
/// and actions against vanished rooms are silent no-ops instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Display name must not be empty")]
    InvalidName,

    #[error("That name is already taken in this room")]
    NameTaken,

    #[error("No player with that name in this room")]
    PlayerNotFound,

    #[error("At least {0} players required to start the round")]
    InsufficientPlayers(usize),

    #[error("Only the host can do that")]
    NotAuthorized,
}

impl RoomError {
    /// Stable code for the wire-level `error` message
    pub fn code(&self) -> &'static str {
        match self {
            RoomError::RoomNotFound => "ROOM_NOT_FOUND",
            RoomError::InvalidName => "INVALID_NAME",
            RoomError::NameTaken => "NAME_TAKEN",
            RoomError::PlayerNotFound => "PLAYER_NOT_FOUND",
            RoomError::InsufficientPlayers(_) => "INSUFFICIENT_PLAYERS",
            RoomError::NotAuthorized => "NOT_AUTHORIZED",
        }
    }
}
