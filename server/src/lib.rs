pub mod config;
pub mod connection;
mod connection_tx_storage;
pub mod handlers;
pub mod server;
