//! Jungle Speed game engine - card model, state machine, and views.
//!
//! This module provides:
//! - Cards, decks and seats
//! - The round state machine (waiting, playing, finished)
//! - Turn, match and bottle-grab resolution
//! - Serializable snapshots and action results for broadcast

pub mod constants;
pub mod engine;
pub mod entities;
pub mod views;

pub use engine::{
    CooldownTicket, DrawError, DrawOutcome, GameEngine, GrabError, GrabKind, GrabResolution,
    UserError,
};
