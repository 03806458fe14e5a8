use thiserror::Error;

use crate::protocol::ServerMessage;

/// Validation rejections surfaced to the originating client only.
///
/// Commands that are merely inapplicable (acting out of turn, wrong phase)
/// are dropped without error; only these explicit rejections reach the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Room not found.")]
    RoomNotFound,
    #[error("Game already started.")]
    GameAlreadyStarted,
    #[error("Need at least 2 players.")]
    NeedMorePlayers,
    #[error("Only the host can start a new game.")]
    HostOnly,
    #[error("Game is still in progress.")]
    GameInProgress,
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::RoomNotFound => "ROOM_NOT_FOUND",
            GameError::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            GameError::NeedMorePlayers => "NEED_MORE_PLAYERS",
            GameError::HostOnly => "HOST_ONLY",
            GameError::GameInProgress => "GAME_IN_PROGRESS",
        }
    }
}

impl From<GameError> for ServerMessage {
    fn from(err: GameError) -> Self {
        ServerMessage::Error {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}
