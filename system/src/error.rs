use thiserror::Error;

use crate::message::ErrorReport;

/// Why an inbound event was rejected. Rejections never touch room state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("invalid json: {0}")]
    InvalidJson(String),

    #[error("invalid binary frame: {0}")]
    InvalidBinary(String),

    #[error("unsupported {0} frame")]
    UnsupportedFrame(&'static str),

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("malformed payload for {event}: {reason}")]
    MalformedPayload { event: &'static str, reason: String },

    #[error("{field} of {event} must be a finite number")]
    NonFinite {
        event: &'static str,
        field: &'static str,
    },

    #[error("cannot encode {event}: {reason}")]
    Encode { event: &'static str, reason: String },
}

impl ProtocolError {
    /// Name of the event the error refers to, when it is known.
    pub fn event(&self) -> Option<&str> {
        match self {
            Self::InvalidJson(_) | Self::InvalidBinary(_) | Self::UnsupportedFrame(_) => None,
            Self::UnknownEvent(event) => Some(event),
            Self::MalformedPayload { event, .. }
            | Self::NonFinite { event, .. }
            | Self::Encode { event, .. } => Some(event),
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            event: self.event().map(str::to_owned),
            message: self.to_string(),
        }
    }
}
