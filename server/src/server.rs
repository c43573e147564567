use std::collections::VecDeque;

use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use system::{ConnectionId, Delivery, EventRouter, RoomStore};

use super::connection::ConnectionCommand;
use crate::connection_tx_storage::{ConnectionTxStorage, DeliveryError};

pub type ServerTx = UnboundedSender<ConnectionCommand>;

/// The sequencer. Commands are applied one at a time in arrival order, so
/// every room mutation is totally ordered.
struct Server {
    router: EventRouter,
    connections: ConnectionTxStorage,
}

impl Server {
    fn new(rooms: RoomStore) -> Self {
        Self {
            router: EventRouter::new(rooms),
            connections: ConnectionTxStorage::new(),
        }
    }

    fn handle_connection_command(&mut self, command: ConnectionCommand) {
        match command {
            ConnectionCommand::Connect { tx } => {
                let (connection_id, deliveries) = self.router.connect();
                self.connections.insert(connection_id, tx);
                self.dispatch(deliveries);
            }
            ConnectionCommand::Disconnect { from } => {
                let deliveries = self.disconnect(&from);
                self.dispatch(deliveries);
            }
            ConnectionCommand::ClientEvent { from, event } => {
                let deliveries = self.router.handle(from, event);
                self.dispatch(deliveries);
            }
        }
    }

    /// Best-effort, at-most-once. A connection whose outbox has gone away is
    /// disconnected and its room told so.
    fn dispatch(&mut self, deliveries: Vec<Delivery>) {
        let mut queue = VecDeque::from(deliveries);
        while let Some(Delivery { to, event }) = queue.pop_front() {
            let name = event.name();
            match self.connections.send(&to, event) {
                Ok(()) => {}
                Err(DeliveryError::Unknown) => {
                    log::debug!("Skipping {} for departed connection {}", name, to);
                }
                Err(DeliveryError::Full) => {
                    log::warn!("Dropping {} for connection {}: outbox is full", name, to);
                }
                Err(DeliveryError::Closed) => {
                    log::warn!("Connection {} vanished during {} fan-out", to, name);
                    queue.extend(self.disconnect(&to));
                }
            }
        }
    }

    fn disconnect(&mut self, connection_id: &ConnectionId) -> Vec<Delivery> {
        self.connections.remove(connection_id);
        self.router.disconnect(connection_id)
    }
}

pub fn spawn_server(rooms: RoomStore) -> ServerTx {
    let (srv_tx, mut srv_rx) = unbounded_channel::<ConnectionCommand>();

    tokio::spawn(async move {
        let mut server = Box::new(Server::new(rooms));
        log::info!("sequencer - started");

        while let Some(command) = srv_rx.recv().await {
            server.handle_connection_command(command);
        }

        log::info!(
            "sequencer - terminated with {} rooms, {} connections",
            server.router.rooms().room_count(),
            server.connections.len()
        );
    });

    srv_tx
}
