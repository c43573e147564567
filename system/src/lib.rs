pub extern crate bincode;
pub extern crate serde;
pub extern crate serde_json;
pub extern crate uuid;

pub mod codec;
mod connection_registry;
mod error;
mod event_router;
mod message;
mod room_store;

pub use codec::{Frame, FrameFormat};
pub use connection_registry::*;
pub use error::*;
pub use event_router::*;
pub use message::*;
pub use room_store::*;
