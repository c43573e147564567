use std::collections::HashMap;

use system::{ConnectionId, ServerEvent};
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;

pub type ConnectionTx = tokio::sync::mpsc::Sender<ServerEvent>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("no outbox for connection")]
    Unknown,
    #[error("outbox is full")]
    Full,
    #[error("outbox is closed")]
    Closed,
}

/// Outboxes of the live connections. Sending never waits.
pub struct ConnectionTxStorage {
    connection_txs: HashMap<ConnectionId, ConnectionTx>,
}

impl ConnectionTxStorage {
    pub fn new() -> Self {
        Self {
            connection_txs: HashMap::new(),
        }
    }

    pub fn insert(&mut self, connection_id: ConnectionId, tx: ConnectionTx) {
        self.connection_txs.insert(connection_id, tx);
    }

    pub fn send(&self, to: &ConnectionId, event: ServerEvent) -> Result<(), DeliveryError> {
        let tx = self.connection_txs.get(to).ok_or(DeliveryError::Unknown)?;
        tx.try_send(event).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<ConnectionTx> {
        self.connection_txs.remove(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connection_txs.len()
    }
}
