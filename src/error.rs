use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::room::{PlayerId, RoomStatus};

/// An operation that the room's current state does not allow.
///
/// Returning one of these never mutates the room.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("no room exists with id {0}")]
    RoomNotFound(String),
    #[error("player {0} is not in this room")]
    UnknownPlayer(PlayerId),
    #[error("game cannot be started while {0}")]
    CannotStart(RoomStatus),
    #[error("only the drawing player can {0}")]
    NotDrawer(&'static str),
    #[error("there is no word to guess")]
    NoActiveRound,
    #[error("no word is being chosen")]
    NoWordToChoose,
    #[error("the drawing player cannot guess")]
    DrawerGuess,
    #[error("chosen word cannot be empty")]
    EmptyWord,
    #[error("room is not accepting commands")]
    RoomClosed,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported frame")]
    UnsupportedFrame,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Game(#[from] GameError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            // Unknown rooms are rejected as bad requests, before any upgrade.
            ApiError::Game(GameError::RoomNotFound(_)) => StatusCode::BAD_REQUEST,
            ApiError::Game(GameError::RoomClosed) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Game(_) => StatusCode::CONFLICT,
        };
        let body = Json(json!({
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}
