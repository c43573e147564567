//! Event Router
//!
//! Applies inbound events to the room state and computes who receives what.
//! It performs no I/O: every handler returns the [`Delivery`] list the caller
//! has to send, in order.
//!
//! | event        | mutation            | recipients                 |
//! |--------------|---------------------|----------------------------|
//! | join-board   | membership          | sender (history replay)    |
//! | draw-stroke  | append to history   | room members except sender |
//! | cursor-move  | none                | room members except sender |
//! | clear-board  | clear history       | every room member          |
//!
//! Room ids supplied by the client are trusted. Draw, cursor and clear events
//! do not check that the sender is a member of the room they address.

use crate::connection_registry::ConnectionRegistry;
use crate::error::ProtocolError;
use crate::message::*;
use crate::room_store::RoomStore;

/// One outbound event addressed to one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

pub struct EventRouter {
    rooms: RoomStore,
    connections: ConnectionRegistry,
}

impl EventRouter {
    pub fn new(rooms: RoomStore) -> Self {
        Self {
            rooms,
            connections: ConnectionRegistry::new(),
        }
    }

    pub fn rooms(&self) -> &RoomStore {
        &self.rooms
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    /// Registers a new connection and tells it its identity.
    pub fn connect(&mut self) -> (ConnectionId, Vec<Delivery>) {
        let connection_id = self.connections.register();
        let deliveries = unicast(
            connection_id,
            ServerEvent::Connected(UserRef {
                user_id: connection_id,
            }),
        );
        (connection_id, deliveries)
    }

    /// Releases the connection's membership and lets the rest of its room know.
    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Vec<Delivery> {
        match self.connections.remove(&mut self.rooms, connection_id) {
            Some(room_id) => self.broadcast(
                &room_id,
                ServerEvent::UserLeft(UserRef {
                    user_id: *connection_id,
                }),
                Some(connection_id),
            ),
            None => Vec::new(),
        }
    }

    pub fn handle(&mut self, from: ConnectionId, event: ClientEvent) -> Vec<Delivery> {
        if !self.connections.contains(&from) {
            log::warn!("Dropping {} from unknown connection {}", event.name(), from);
            return Vec::new();
        }
        if let Err(err) = validate(&event) {
            return self.reject(from, &err);
        }
        log::debug!("{} {:?} from {}", event.name(), event.room_id(), from);

        match event {
            ClientEvent::JoinBoard(room_id) => {
                self.connections.set_room(&mut self.rooms, from, &room_id);
                unicast(from, ServerEvent::LoadHistory(self.rooms.history(&room_id)))
            }
            ClientEvent::DrawStroke(DrawStrokePayload {
                room_id,
                stroke_data,
            }) => {
                self.rooms.append_stroke(&room_id, stroke_data.clone());
                self.broadcast(&room_id, ServerEvent::DrawStroke(stroke_data), Some(&from))
            }
            ClientEvent::CursorMove(CursorMovePayload {
                room_id,
                cursor_data,
            }) => {
                let cursor = CursorMoved {
                    user_id: from,
                    x: cursor_data.x,
                    y: cursor_data.y,
                    name: cursor_data.name,
                };
                self.broadcast(&room_id, ServerEvent::CursorMove(cursor), Some(&from))
            }
            ClientEvent::ClearBoard(room_id) => {
                self.rooms.clear(&room_id);
                self.broadcast(&room_id, ServerEvent::ClearBoard, None)
            }
        }
    }

    /// Reports a rejected event to its sender only.
    pub fn reject(&self, to: ConnectionId, err: &ProtocolError) -> Vec<Delivery> {
        log::warn!("Rejected event from {}: {}", to, err);
        unicast(to, ServerEvent::Error(err.report()))
    }

    /// Every current member of `room_id` except `without`.
    pub fn broadcast(
        &self,
        room_id: &str,
        event: ServerEvent,
        without: Option<&ConnectionId>,
    ) -> Vec<Delivery> {
        self.rooms
            .members(room_id)
            .iter()
            .filter(|member| without.map_or(true, |excluded| excluded != *member))
            .map(|member| Delivery {
                to: *member,
                event: event.clone(),
            })
            .collect()
    }
}

fn unicast(to: ConnectionId, event: ServerEvent) -> Vec<Delivery> {
    vec![Delivery { to, event }]
}

fn validate(event: &ClientEvent) -> Result<(), ProtocolError> {
    let name = event.name();
    let finite = |field: &'static str, value: f64| {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ProtocolError::NonFinite { event: name, field })
        }
    };

    match event {
        ClientEvent::DrawStroke(payload) => {
            let stroke = &payload.stroke_data;
            finite("x1", stroke.x1)?;
            finite("y1", stroke.y1)?;
            finite("x2", stroke.x2)?;
            finite("y2", stroke.y2)?;
            finite("width", stroke.width)
        }
        ClientEvent::CursorMove(payload) => {
            finite("x", payload.cursor_data.x)?;
            finite("y", payload.cursor_data.y)
        }
        ClientEvent::JoinBoard(_) | ClientEvent::ClearBoard(_) => Ok(()),
    }
}
