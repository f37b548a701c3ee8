//! Core game logic: card and deck models, the turn engine, and the
//! move validator.

pub mod constants;
pub mod entities;
pub mod state_machine;

pub use state_machine::{GameEvent, GameSettings, GameState, UserError};
