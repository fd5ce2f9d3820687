//! Rooms for the Halma server.
//!
//! A room hosts one two-player match. All rooms live in a single
//! [`SessionRegistry`], owned by one actor task so that every request
//! (mutation plus the messages it produces) runs to completion before the
//! next one starts.
//!
//! # Key types
//!
//! - [`Match`]: per-room state machine (seats, pieces, turn, winner)
//! - [`SessionRegistry`]: room codes, joins, teardown, request dispatch
//! - [`RegistryHandle`]: send commands to the running registry actor
//! - [`MatchPhase`]: lifecycle state machine
//! - [`RegistryConfig`] / [`MatchConfig`]: code length, RNG seed, win rule

mod actor;
mod config;
mod error;
mod game;
mod registry;

pub use actor::{spawn_registry, PlayerSender, RegistryHandle, RegistryInfo};
pub use config::{MatchConfig, MatchPhase, RegistryConfig, WinRule};
pub use error::RoomError;
pub use game::{Match, MoveOutcome, Player};
pub use registry::{Delivery, SessionRegistry};
