use std::collections::HashMap;

use crate::message::{ConnectionId, RoomId};
use crate::room_store::RoomStore;

/// Live connections and the room each one is in. Membership itself lives in
/// the [`RoomStore`] so fan-out reads a single place.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connection_locations: HashMap<ConnectionId, Option<RoomId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self) -> ConnectionId {
        let connection_id = uuid::Uuid::new_v4();
        self.connection_locations.insert(connection_id, None);
        log::info!("Connection {} registered", connection_id);
        connection_id
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connection_locations.contains_key(connection_id)
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<&str> {
        self.connection_locations
            .get(connection_id)
            .and_then(|room_id| room_id.as_deref())
    }

    /// Moves the connection out of its previous room, if any, and into
    /// `room_id`. Returns the previous room.
    pub fn set_room(
        &mut self,
        rooms: &mut RoomStore,
        connection_id: ConnectionId,
        room_id: &str,
    ) -> Option<RoomId> {
        let previous = self
            .connection_locations
            .insert(connection_id, Some(room_id.to_owned()))
            .flatten();

        if let Some(previous) = previous.as_deref() {
            if previous != room_id {
                rooms.remove_member(previous, &connection_id);
            }
        }
        rooms.add_member(room_id, connection_id);
        log::info!("Connection {} joined room {:?}", connection_id, room_id);

        previous
    }

    /// Forgets the connection and releases its membership. Stroke history is
    /// left as it is.
    pub fn remove(
        &mut self,
        rooms: &mut RoomStore,
        connection_id: &ConnectionId,
    ) -> Option<RoomId> {
        let room_id = self.connection_locations.remove(connection_id).flatten();
        if let Some(room_id) = room_id.as_deref() {
            rooms.remove_member(room_id, connection_id);
        }
        log::info!("Connection {} removed", connection_id);
        room_id
    }

    pub fn len(&self) -> usize {
        self.connection_locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connection_locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Stroke;

    #[test]
    fn it_assigns_distinct_identities() {
        let mut registry = ConnectionRegistry::new();
        let a = registry.register();
        let b = registry.register();
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.room_of(&a), None);
    }

    #[test]
    fn it_moves_connection_between_rooms() {
        let mut rooms = RoomStore::default();
        let mut registry = ConnectionRegistry::new();
        let a = registry.register();

        assert_eq!(registry.set_room(&mut rooms, a, "first"), None);
        assert_eq!(rooms.members("first"), &[a]);

        assert_eq!(
            registry.set_room(&mut rooms, a, "second"),
            Some("first".to_owned())
        );
        assert!(rooms.members("first").is_empty());
        assert_eq!(rooms.members("second"), &[a]);
        assert_eq!(registry.room_of(&a), Some("second"));
    }

    #[test]
    fn it_keeps_membership_when_rejoining_same_room() {
        let mut rooms = RoomStore::default();
        let mut registry = ConnectionRegistry::new();
        let a = registry.register();
        let b = registry.register();
        registry.set_room(&mut rooms, a, "general");
        registry.set_room(&mut rooms, b, "general");
        registry.set_room(&mut rooms, a, "general");
        assert_eq!(rooms.members("general"), &[a, b]);
    }

    #[test]
    fn it_releases_membership_but_keeps_history_on_remove() {
        let mut rooms = RoomStore::default();
        let mut registry = ConnectionRegistry::new();
        let a = registry.register();
        registry.set_room(&mut rooms, a, "general");
        let stroke = Stroke {
            x1: 0.0,
            y1: 0.0,
            x2: 1.0,
            y2: 1.0,
            color: "#007aff".into(),
            width: 3.0,
        };
        rooms.append_stroke("general", stroke.clone());

        assert_eq!(registry.remove(&mut rooms, &a), Some("general".to_owned()));
        assert!(!registry.contains(&a));
        assert!(rooms.members("general").is_empty());
        assert_eq!(rooms.history("general"), vec![stroke]);
        assert!(registry.is_empty());
    }

    #[test]
    fn it_tolerates_removing_unassigned_connection() {
        let mut rooms = RoomStore::default();
        let mut registry = ConnectionRegistry::new();
        let a = registry.register();
        assert_eq!(registry.remove(&mut rooms, &a), None);
        assert_eq!(registry.remove(&mut rooms, &a), None);
        assert_eq!(rooms.room_count(), 0);
    }
}
