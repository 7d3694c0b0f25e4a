//! Wire format shared with game clients.
//!
//! Every frame is an envelope `{"message_type": TAG, "message": BODY}`. The
//! body's shape depends on the tag, so both directions are modelled as
//! adjacently tagged enums: a frame either decodes into a known variant with a
//! well-formed body or it is rejected as a whole.

use axum::extract::ws::Message;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::room::{PlayerId, RoomId};

/// Sender name used for messages produced by the game itself.
pub const ADMIN_SENDER: &str = "ADMIN";

/// Messages accepted from a connected player.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "message_type", content = "message")]
pub enum ClientMessage {
    #[serde(rename = "START_GAME")]
    StartGame,
    #[serde(rename = "CHOOSED_WORD")]
    ChooseWord(String),
    #[serde(rename = "CHAT")]
    Chat(ChatText),
    #[serde(rename = "GUESS")]
    Guess(ChatText),
    #[serde(rename = "DRAW")]
    Draw(Stroke),
}

impl ClientMessage {
    pub fn decode(frame: &Message) -> Result<Self, ProtocolError> {
        match frame {
            Message::Text(text) => Ok(serde_json::from_str(text)?),
            Message::Binary(bytes) => Ok(serde_json::from_slice(bytes)?),
            _ => Err(ProtocolError::UnsupportedFrame),
        }
    }

    /// Tag used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::StartGame => "START_GAME",
            ClientMessage::ChooseWord(_) => "CHOOSED_WORD",
            ClientMessage::Chat(_) => "CHAT",
            ClientMessage::Guess(_) => "GUESS",
            ClientMessage::Draw(_) => "DRAW",
        }
    }
}

/// Chat and guess bodies: either the bare text or a full chat record.
///
/// Any sender or time in a record is ignored, the server fills them in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChatText {
    Plain(String),
    Record { message: String },
}

impl ChatText {
    pub fn into_text(self) -> String {
        match self {
            ChatText::Plain(text) => text,
            ChatText::Record { message, .. } => message,
        }
    }
}

/// A single stroke segment of the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Line {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

/// A draw body as the drawer sent it.
///
/// It only decodes when it describes a [`Line`], but the body itself is kept
/// and relayed untouched, so client-specific fields and number formats reach
/// the other players as they were sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Stroke(Value);

impl<'de> Deserialize<'de> for Stroke {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let body = Value::deserialize(deserializer)?;
        Line::deserialize(&body).map_err(de::Error::custom)?;
        Ok(Stroke(body))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub message: String,
    pub sender: String,
    pub time: i64,
}

impl ChatRecord {
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sender: sender.into(),
            time: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn admin(message: impl Into<String>) -> Self {
        Self::new(ADMIN_SENDER, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Started,
    Complete,
    RoundAborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordOptions {
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub player_id: PlayerId,
    pub player_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub room_name: String,
}

/// Messages pushed to players and room-update subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "message_type", content = "message")]
pub enum ServerMessage {
    #[serde(rename = "PLAYER_CREATED")]
    PlayerCreated(PlayerInfo),
    #[serde(rename = "ADMIN_MESSAGE")]
    Admin(ChatRecord),
    #[serde(rename = "CHAT")]
    Chat(ChatRecord),
    #[serde(rename = "GAME_STATUS")]
    GameStatus(GameStatus),
    #[serde(rename = "CHOOSE_WORD")]
    WordOptions(WordOptions),
    #[serde(rename = "DRAWING_PLAYER")]
    DrawingPlayer(PlayerId),
    #[serde(rename = "PLAYER_CHOOSING_WORD")]
    PlayerChoosingWord(String),
    #[serde(rename = "GAME_WORD")]
    GameWord(String),
    #[serde(rename = "GAME_WORD_CLUE")]
    GameWordClue(String),
    #[serde(rename = "DRAW")]
    Draw(Stroke),
    #[serde(rename = "ROOM_CREATED")]
    RoomCreated(RoomSummary),
    #[serde(rename = "ERROR")]
    Error(String),
}

impl ServerMessage {
    pub fn admin(message: impl Into<String>) -> Self {
        ServerMessage::Admin(ChatRecord::admin(message))
    }

    pub fn to_message(&self) -> Result<Message, ProtocolError> {
        Ok(Message::Text(serde_json::to_string(self)?))
    }
}
