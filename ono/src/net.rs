//! Networking layer for client-server communication.
//!
//! A custom binary protocol over TCP: u32-length-prefixed bincode
//! frames. The server side runs on tokio; the blocking client is used
//! by the terminal client and the integration tests.

/// Blocking TCP client for connecting to a game server.
pub mod client;

/// Error types for serialization and framing.
pub mod errors;

/// Message types for the client-server protocol.
pub mod messages;

/// The authority process: lobby registration, session relays, and the
/// room actor wiring.
pub mod server;

/// Utilities for binary message serialization and framing.
pub mod utils;
