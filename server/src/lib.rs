pub mod connection;
mod connection_tx_storage;
mod room;
pub mod server;
mod server_state;
