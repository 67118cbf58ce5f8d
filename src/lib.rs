//! A minimal real-time chat relay speaking a subset of IRC.
//!
//! Connections register an identity with `NICK`, join `#`-prefixed rooms,
//! and exchange text either directly with another identity or by
//! broadcast to a room's members. The relay is a pure fan-out engine: it
//! keeps no history and persists nothing across restarts.
//! [`engine::Engine`] is its entry point.

pub mod client;
pub mod config;
pub mod driver;
pub mod engine;
pub mod lines;

mod channel;
mod registry;
