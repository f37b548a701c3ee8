//! # Ono
//!
//! An UNO-style multiplayer card game engine.
//!
//! A central authority coordinates several concurrently-connected
//! player sessions. Each session submits exactly one move per turn; the
//! shared game state (deck, hands, discard pile, direction, current
//! player) advances deterministically under a single-writer discipline.
//!
//! ## Architecture
//!
//! The game state is exclusively owned by a room actor rather than
//! shared behind a lock: per-player session tasks submit moves over an
//! mpsc inbox and the actor applies them one at a time, waking only
//! when a message arrives. Out-of-turn submissions are rejected with an
//! explicit notice and never applied.
//!
//! ## Core Modules
//!
//! - [`game`]: Card/deck models, the turn engine, and move validation
//! - [`room`]: The actor that owns a running match
//! - [`net`]: Networking components (server, client, message protocol)
//! - [`journal`]: The append-only match journal
//!
//! ## Example
//!
//! ```
//! use ono::game::{GameSettings, GameState};
//! use ono::game::entities::Username;
//!
//! // Deal a three-player match.
//! let names = vec![
//!     Username::new("alice"),
//!     Username::new("bob"),
//!     Username::new("carol"),
//! ];
//! let game = GameState::new(names, &GameSettings::default()).unwrap();
//! assert_eq!(game.current_player(), 0);
//! ```

/// Core game logic, entities, and the turn engine.
pub mod game;
pub use game::{
    GameEvent, GameSettings, GameState, UserError,
    constants::{self, MAX_SEATS, MIN_SEATS},
    entities,
};

/// The append-only match journal.
pub mod journal;
pub use journal::Journal;

/// Networking components for client-server communication.
pub mod net;
pub use net::{client::Client, messages, server, utils};

/// The room actor owning a running match.
pub mod room;
pub use room::{RoomActor, RoomConfig, RoomHandle, RoomResponse};
