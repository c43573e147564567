use std::collections::{HashMap, VecDeque};
use std::num::NonZeroUsize;

use crate::message::{ConnectionId, RoomId, Stroke};

/// How much stroke history a room keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    Unbounded,
    /// Ring buffer: the oldest strokes are dropped once the cap is reached.
    Capped(NonZeroUsize),
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::Unbounded
    }
}

impl RetentionPolicy {
    fn enforce(&self, history: &mut VecDeque<Stroke>) {
        if let RetentionPolicy::Capped(cap) = self {
            while history.len() > cap.get() {
                history.pop_front();
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Room {
    history: VecDeque<Stroke>,
    members: Vec<ConnectionId>,
}

impl Room {
    pub fn history(&self) -> Vec<Stroke> {
        self.history.iter().cloned().collect()
    }

    /// Members in join order.
    pub fn members(&self) -> &[ConnectionId] {
        self.members.as_slice()
    }
}

/// Per-room stroke history and membership. Rooms are created on first
/// reference and live as long as the store.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: HashMap<RoomId, Room>,
    retention: RetentionPolicy,
}

impl RoomStore {
    pub fn new(retention: RetentionPolicy) -> Self {
        Self {
            rooms: HashMap::new(),
            retention,
        }
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    pub fn get_or_create(&mut self, room_id: &str) -> &mut Room {
        self.rooms.entry(room_id.to_owned()).or_insert_with(|| {
            log::info!("Room {:?} created", room_id);
            Room::default()
        })
    }

    pub fn get(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn append_stroke(&mut self, room_id: &str, stroke: Stroke) {
        let retention = self.retention;
        let room = self.get_or_create(room_id);
        room.history.push_back(stroke);
        retention.enforce(&mut room.history);
    }

    /// Empties the history. Membership is untouched.
    pub fn clear(&mut self, room_id: &str) {
        self.get_or_create(room_id).history.clear();
    }

    /// Snapshot of the history at call time. Unknown rooms have none.
    pub fn history(&self, room_id: &str) -> Vec<Stroke> {
        self.rooms
            .get(room_id)
            .map(Room::history)
            .unwrap_or_default()
    }

    pub fn members(&self, room_id: &str) -> &[ConnectionId] {
        self.rooms
            .get(room_id)
            .map(Room::members)
            .unwrap_or(&[])
    }

    pub(crate) fn add_member(&mut self, room_id: &str, connection_id: ConnectionId) {
        let room = self.get_or_create(room_id);
        if !room.members.contains(&connection_id) {
            room.members.push(connection_id);
        }
    }

    pub(crate) fn remove_member(&mut self, room_id: &str, connection_id: &ConnectionId) {
        if let Some(room) = self.rooms.get_mut(room_id) {
            room.members.retain(|member| member != connection_id);
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
