//! Room module: the turn-synchronization gate as an async actor.
//!
//! The original design for this kind of engine is a mutex-guarded
//! shared state with a condition variable the authority sleeps on.
//! Here the same single-move-in-flight contract is kept behind a
//! message-passing boundary instead: [`RoomActor`] exclusively owns the
//! game state and drains an mpsc inbox, per-player session tasks submit
//! moves with oneshot responses, and notices flow back through per-seat
//! outbound channels. Out-of-turn submissions are answered with an
//! explicit rejection and never applied.

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use messages::{RoomMessage, RoomResponse};
