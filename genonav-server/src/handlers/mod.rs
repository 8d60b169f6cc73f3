//! Client connection handlers

mod connection;

pub use connection::handle_client;
