//! Table actor message types.

use tokio::sync::{mpsc, oneshot};

use crate::game::{
    CooldownTicket, DrawError, DrawOutcome, GrabError, GrabResolution, UserError,
    entities::{PlayerId, PlayerName},
    views::GameStateView,
};

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Take a seat
    Join {
        player_id: PlayerId,
        name: PlayerName,
        response: oneshot::Sender<Result<(), UserError>>,
    },

    /// Give up a seat (also sent on disconnect)
    Leave {
        player_id: PlayerId,
        response: oneshot::Sender<()>,
    },

    /// Deal a new round
    Start {
        response: oneshot::Sender<Result<(), UserError>>,
    },

    /// Turn over the next card
    Draw {
        player_id: PlayerId,
        response: oneshot::Sender<Result<DrawOutcome, DrawError>>,
    },

    /// Grab the bottle
    Grab {
        player_id: PlayerId,
        response: oneshot::Sender<Result<GrabResolution, GrabError>>,
    },

    /// Get a snapshot of the table
    GetState {
        response: oneshot::Sender<GameStateView>,
    },

    /// Close table
    Close { response: oneshot::Sender<()> },

    /// Internal: the cooldown started by a grab has elapsed
    CooldownExpired(CooldownTicket),

    /// Subscribe to state change notifications
    Subscribe {
        subscriber_id: PlayerId,
        sender: mpsc::Sender<StateChangeNotification>,
    },

    /// Unsubscribe from state change notifications
    Unsubscribe { subscriber_id: PlayerId },
}

/// Notification sent when table state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeNotification {
    /// A card was drawn or the bottle was grabbed
    StateChanged,
    /// Player joined or left
    PlayerListChanged,
    /// A new round was dealt
    RoundStarted,
    /// Draws are allowed again after a grab
    CooldownCleared,
}
