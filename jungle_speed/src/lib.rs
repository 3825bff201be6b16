//! # Jungle Speed
//!
//! A real-time multiplayer card game engine. Players take turns turning over
//! cards and race to grab a shared bottle whenever two face-up cards share a
//! rank or a jack (the joker) shows up.
//!
//! ## Core Modules
//!
//! - [`game`]: Card model, the round state machine and broadcast views
//! - [`table`]: Async actor that serializes every engine operation, including
//!   the cooldown timer that follows each grab
//!
//! ## Example
//!
//! ```
//! use jungle_speed::{GameEngine, PlayerId};
//!
//! let mut game = GameEngine::new();
//! game.join(PlayerId::new("a"), "alice".into()).unwrap();
//! game.join(PlayerId::new("b"), "bob".into()).unwrap();
//! game.start_game().unwrap();
//! assert!(game.draw(&PlayerId::new("a")).is_ok());
//! ```

/// Core game logic, entities, and views.
pub mod game;
pub use game::{
    DrawError, DrawOutcome, GameEngine, GrabError, GrabKind, UserError,
    constants::{self, GRAB_COOLDOWN, MAX_PLAYERS, MIN_PLAYERS},
    entities::{self, Card, Phase, PlayerId, PlayerName},
    views::{self, DrawResult, GameStateView, GrabResult, JoinResult},
};

/// Table actor and its message protocol.
pub mod table;
