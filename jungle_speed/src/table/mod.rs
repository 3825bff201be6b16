//! Table module running the game session behind an async actor.
//!
//! This module implements:
//! - TableActor: Async actor that owns the [`GameEngine`](crate::GameEngine)
//! - Message-based communication with tokio channels
//! - Cooldown timers that post back into the actor's inbox
//! - State change notifications for broadcasting snapshots
//!
//! ## Architecture
//!
//! The table runs in its own Tokio task with an mpsc message inbox, so every
//! join, leave, start, draw and grab is applied one at a time. A grab spawns a
//! timer task that sends `CooldownExpired` back through the same inbox when
//! the cooldown elapses.
//!
//! ## Example
//!
//! ```
//! use jungle_speed::table::{TableActor, TableConfig};
//! use jungle_speed::PlayerId;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (actor, handle) = TableActor::new(TableConfig::default());
//! tokio::spawn(actor.run());
//!
//! let joined = handle.join(PlayerId::new("a"), "alice".into()).await.unwrap();
//! assert!(joined.is_ok());
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod messages;

pub use actor::{TableActor, TableError, TableHandle};
pub use config::TableConfig;
pub use messages::{StateChangeNotification, TableMessage};
