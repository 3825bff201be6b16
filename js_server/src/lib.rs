//! Jungle Speed game server.
//!
//! Exposes the single game table over a WebSocket API and pushes a fresh
//! snapshot to every connected client whenever the table changes.

pub mod api;
pub mod config;
pub mod logging;
