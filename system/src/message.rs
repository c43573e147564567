use serde::{Deserialize, Serialize};

pub type ConnectionId = uuid::Uuid;
pub type RoomId = String;

pub const JOIN_BOARD: &str = "join-board";
pub const DRAW_STROKE: &str = "draw-stroke";
pub const CURSOR_MOVE: &str = "cursor-move";
pub const CLEAR_BOARD: &str = "clear-board";
pub const LOAD_HISTORY: &str = "load-history";
pub const CONNECTED: &str = "connected";
pub const USER_LEFT: &str = "user-left";
pub const ERROR: &str = "error";

/// One line segment of a freehand path. A drag gesture is many strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorData {
    pub x: f64,
    pub y: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawStrokePayload {
    pub room_id: RoomId,
    pub stroke_data: Stroke,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorMovePayload {
    pub room_id: RoomId,
    pub cursor_data: CursorData,
}

/// Events a client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    JoinBoard(RoomId),
    DrawStroke(DrawStrokePayload),
    CursorMove(CursorMovePayload),
    ClearBoard(RoomId),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinBoard(_) => JOIN_BOARD,
            Self::DrawStroke(_) => DRAW_STROKE,
            Self::CursorMove(_) => CURSOR_MOVE,
            Self::ClearBoard(_) => CLEAR_BOARD,
        }
    }

    pub fn room_id(&self) -> &str {
        match self {
            Self::JoinBoard(room_id) | Self::ClearBoard(room_id) => room_id,
            Self::DrawStroke(payload) => &payload.room_id,
            Self::CursorMove(payload) => &payload.room_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorMoved {
    pub user_id: ConnectionId,
    pub x: f64,
    pub y: f64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: ConnectionId,
}

/// Sent back to the sender of an event that was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub event: Option<String>,
    pub message: String,
}

/// Events the server sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerEvent {
    Connected(UserRef),
    LoadHistory(Vec<Stroke>),
    DrawStroke(Stroke),
    CursorMove(CursorMoved),
    ClearBoard,
    UserLeft(UserRef),
    Error(ErrorReport),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected(_) => CONNECTED,
            Self::LoadHistory(_) => LOAD_HISTORY,
            Self::DrawStroke(_) => DRAW_STROKE,
            Self::CursorMove(_) => CURSOR_MOVE,
            Self::ClearBoard => CLEAR_BOARD,
            Self::UserLeft(_) => USER_LEFT,
            Self::Error(_) => ERROR,
        }
    }
}
