pub mod actor;
pub mod args;
pub mod dispatch;
pub mod error;
pub mod protocol;
pub mod room;
pub mod session;
pub mod state;
pub mod words;

use crate::{
    error::{ApiError, GameError},
    protocol::RoomSummary,
    room::{RoomId, RoomSnapshot},
    state::ServerState,
    words::GameConfig,
};
use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::prelude::*;

pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribble_server=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(false)
                .with_target(false),
        )
        .init();
}

pub async fn run(addr: SocketAddr) -> anyhow::Result<()> {
    serve(addr, GameConfig::default()).await
}

pub async fn serve(addr: SocketAddr, config: GameConfig) -> anyhow::Result<()> {
    let state = ServerState::new(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}

pub fn app(state: ServerState) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .route("/rooms", post(create_room_handler).get(list_rooms_handler))
        .route("/rooms/:name/create", get(create_named_room_handler))
        .route("/room/:room_id", get(room_handler))
        .route(
            "/room/:room_id/players/:player_name/create",
            get(join_room_handler),
        )
        .route("/subscribe/room", get(subscribe_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_handler() -> impl IntoResponse {
    StatusCode::OK
}

async fn ping_handler() -> Json<&'static str> {
    Json("pong")
}

#[derive(Deserialize)]
pub struct CreateRoomRequest {
    room_name: String,
}

async fn create_room_handler(
    State(state): State<ServerState>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<Json<RoomSummary>, ApiError> {
    create_room(&state, payload.room_name)
}

async fn create_named_room_handler(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<RoomSummary>, ApiError> {
    create_room(&state, name)
}

fn create_room(state: &ServerState, name: String) -> Result<Json<RoomSummary>, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidRequest("room name cannot be empty".into()));
    }
    Ok(Json(state.create_room(name.to_string())))
}

async fn list_rooms_handler(State(state): State<ServerState>) -> Json<Vec<RoomSummary>> {
    Json(state.rooms())
}

async fn room_handler(
    State(state): State<ServerState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSnapshot>, ApiError> {
    let room = state.room(&parse_room_id(&room_id)?)?;
    Ok(Json(room.snapshot().await?))
}

#[derive(Deserialize)]
pub struct JoinQuery {
    is_admin: Option<String>,
}

/// Validates the room and name, then hands the upgraded socket to the room.
async fn join_room_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
    Path((room_id, player_name)): Path<(String, String)>,
    Query(query): Query<JoinQuery>,
) -> Result<Response, ApiError> {
    if player_name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("player name cannot be empty".into()));
    }
    let room = state.room(&parse_room_id(&room_id)?)?;
    let is_admin = query
        .is_admin
        .and_then(|value| value.parse::<bool>().ok())
        .unwrap_or(false);

    Ok(ws.on_upgrade(move |socket| {
        session::player_session(socket, room, player_name, is_admin)
    }))
}

async fn subscribe_handler(ws: WebSocketUpgrade, State(state): State<ServerState>) -> Response {
    ws.on_upgrade(move |socket| session::room_updates_session(socket, state))
}

fn parse_room_id(room_id: &str) -> Result<RoomId, GameError> {
    room_id
        .parse()
        .map_err(|_| GameError::RoomNotFound(room_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_room_id_is_not_found() {
        assert_eq!(
            parse_room_id("not-a-room"),
            Err(GameError::RoomNotFound("not-a-room".into()))
        );
    }

    #[test]
    fn room_id_parses_as_uuid() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(parse_room_id(&id.to_string()), Ok(id));
    }
}
