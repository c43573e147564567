//! Frame codec.
//!
//! Text frames carry `{"event": <name>, "data": <payload>}` envelopes, binary
//! frames carry the event enums encoded with bincode.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::message::*;

#[derive(Debug, Serialize, Deserialize)]
struct TextEnvelope {
    event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    Text,
    Binary,
}

impl Default for FrameFormat {
    fn default() -> Self {
        FrameFormat::Text
    }
}

/// An encoded outbound frame, ready to hand to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

pub fn decode_text(text: &str) -> Result<ClientEvent, ProtocolError> {
    let envelope: TextEnvelope =
        serde_json::from_str(text).map_err(|err| ProtocolError::InvalidJson(err.to_string()))?;
    let data = envelope.data.unwrap_or(Value::Null);

    match envelope.event.as_str() {
        JOIN_BOARD => payload(JOIN_BOARD, data).map(ClientEvent::JoinBoard),
        DRAW_STROKE => payload(DRAW_STROKE, data).map(ClientEvent::DrawStroke),
        CURSOR_MOVE => payload(CURSOR_MOVE, data).map(ClientEvent::CursorMove),
        CLEAR_BOARD => payload(CLEAR_BOARD, data).map(ClientEvent::ClearBoard),
        other => Err(ProtocolError::UnknownEvent(other.to_owned())),
    }
}

fn payload<T: DeserializeOwned>(event: &'static str, data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|err| ProtocolError::MalformedPayload {
        event,
        reason: err.to_string(),
    })
}

pub fn decode_binary(bytes: &[u8]) -> Result<ClientEvent, ProtocolError> {
    bincode::deserialize(bytes).map_err(|err| ProtocolError::InvalidBinary(err.to_string()))
}

pub fn encode_text(event: &ServerEvent) -> Result<String, ProtocolError> {
    let name = event.name();
    let to_value = |result: serde_json::Result<Value>| {
        result.map_err(|err| ProtocolError::Encode {
            event: name,
            reason: err.to_string(),
        })
    };

    let data = match event {
        ServerEvent::Connected(user) | ServerEvent::UserLeft(user) => {
            Some(to_value(serde_json::to_value(user))?)
        }
        ServerEvent::LoadHistory(history) => Some(to_value(serde_json::to_value(history))?),
        ServerEvent::DrawStroke(stroke) => Some(to_value(serde_json::to_value(stroke))?),
        ServerEvent::CursorMove(cursor) => Some(to_value(serde_json::to_value(cursor))?),
        ServerEvent::Error(report) => Some(to_value(serde_json::to_value(report))?),
        ServerEvent::ClearBoard => None,
    };

    let envelope = TextEnvelope {
        event: name.to_owned(),
        data,
    };
    serde_json::to_string(&envelope).map_err(|err| ProtocolError::Encode {
        event: name,
        reason: err.to_string(),
    })
}

pub fn encode_binary(event: &ServerEvent) -> Result<Vec<u8>, ProtocolError> {
    bincode::serialize(event).map_err(|err| ProtocolError::Encode {
        event: event.name(),
        reason: err.to_string(),
    })
}

pub fn encode(event: &ServerEvent, format: FrameFormat) -> Result<Frame, ProtocolError> {
    match format {
        FrameFormat::Text => encode_text(event).map(Frame::Text),
        FrameFormat::Binary => encode_binary(event).map(Frame::Binary),
    }
}
