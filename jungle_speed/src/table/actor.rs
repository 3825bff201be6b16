//! Table actor implementation with async message handling.

use super::{
    config::TableConfig,
    messages::{StateChangeNotification, TableMessage},
};
use crate::game::{
    CooldownTicket, DrawError, DrawOutcome, GameEngine, GrabError, GrabResolution, UserError,
    entities::{PlayerId, PlayerName},
    views::GameStateView,
};
use std::collections::HashMap;
use thiserror::Error;
use tokio::{
    sync::{mpsc, oneshot},
    time::sleep,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("table is closed")]
    Closed,
}

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>) -> Self {
        Self { sender }
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), TableError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::Closed)
    }

    /// Send a request built around a fresh reply channel and wait for the reply.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> Result<T, TableError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| TableError::Closed)
    }

    pub async fn join(
        &self,
        player_id: PlayerId,
        name: PlayerName,
    ) -> Result<Result<(), UserError>, TableError> {
        self.request(|response| TableMessage::Join {
            player_id,
            name,
            response,
        })
        .await
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<(), TableError> {
        self.request(|response| TableMessage::Leave {
            player_id,
            response,
        })
        .await
    }

    pub async fn start(&self) -> Result<Result<(), UserError>, TableError> {
        self.request(|response| TableMessage::Start { response })
            .await
    }

    pub async fn draw(
        &self,
        player_id: PlayerId,
    ) -> Result<Result<DrawOutcome, DrawError>, TableError> {
        self.request(|response| TableMessage::Draw {
            player_id,
            response,
        })
        .await
    }

    pub async fn grab(
        &self,
        player_id: PlayerId,
    ) -> Result<Result<GrabResolution, GrabError>, TableError> {
        self.request(|response| TableMessage::Grab {
            player_id,
            response,
        })
        .await
    }

    pub async fn state(&self) -> Result<GameStateView, TableError> {
        self.request(|response| TableMessage::GetState { response })
            .await
    }

    pub async fn subscribe(
        &self,
        subscriber_id: PlayerId,
        sender: mpsc::Sender<StateChangeNotification>,
    ) -> Result<(), TableError> {
        self.send(TableMessage::Subscribe {
            subscriber_id,
            sender,
        })
        .await
    }

    pub async fn unsubscribe(&self, subscriber_id: PlayerId) -> Result<(), TableError> {
        self.send(TableMessage::Unsubscribe { subscriber_id }).await
    }

    pub async fn close(&self) -> Result<(), TableError> {
        self.request(|response| TableMessage::Close { response })
            .await
    }
}

/// Table actor owning the single game session.
///
/// Every engine operation, including the cooldown clear that follows a grab,
/// arrives through the inbox and runs to completion before the next one.
pub struct TableActor {
    /// Table configuration
    config: TableConfig,

    /// Game state
    engine: GameEngine,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Used by cooldown timers to post back into the inbox. Weak so that
    /// dropping every handle still shuts the actor down.
    timer_sender: mpsc::WeakSender<TableMessage>,

    /// Is table closed
    is_closed: bool,

    /// Subscribers for state change notifications
    subscribers: HashMap<PlayerId, mpsc::Sender<StateChangeNotification>>,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(config.inbox_capacity.max(1));

        let actor = Self {
            config,
            engine: GameEngine::new(),
            inbox,
            timer_sender: sender.downgrade(),
            is_closed: false,
            subscribers: HashMap::new(),
        };

        (actor, TableHandle::new(sender))
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!("Table '{}' starting", self.config.name);

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);

            if self.is_closed {
                break;
            }
        }

        log::info!("Table '{}' closed", self.config.name);
    }

    /// Handle a table message
    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Join {
                player_id,
                name,
                response,
            } => {
                let result = self.engine.join(player_id, name);
                if result.is_ok() {
                    self.notify_state_change(StateChangeNotification::PlayerListChanged);
                }
                let _ = response.send(result);
            }

            TableMessage::Leave {
                player_id,
                response,
            } => {
                if self.engine.contains_player(&player_id) {
                    self.engine.leave(&player_id);
                    self.notify_state_change(StateChangeNotification::PlayerListChanged);
                }
                let _ = response.send(());
            }

            TableMessage::Start { response } => {
                let result = self.engine.start_game();
                if result.is_ok() {
                    self.notify_state_change(StateChangeNotification::RoundStarted);
                }
                let _ = response.send(result);
            }

            TableMessage::Draw {
                player_id,
                response,
            } => {
                let result = self.engine.draw(&player_id);
                match &result {
                    Ok(_) => self.notify_state_change(StateChangeNotification::StateChanged),
                    Err(e) => log::debug!("Draw by {} rejected: {}", player_id, e),
                }
                let _ = response.send(result);
            }

            TableMessage::Grab {
                player_id,
                response,
            } => {
                let result = self.engine.grab_bottle(&player_id);
                if let Ok(resolution) = &result {
                    self.schedule_cooldown_clear(resolution.cooldown);
                    self.notify_state_change(StateChangeNotification::StateChanged);
                }
                let _ = response.send(result);
            }

            TableMessage::GetState { response } => {
                let _ = response.send(self.engine.snapshot());
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }

            TableMessage::CooldownExpired(ticket) => {
                if self.engine.clear_cooldown(ticket) {
                    self.notify_state_change(StateChangeNotification::CooldownCleared);
                }
            }

            TableMessage::Subscribe {
                subscriber_id,
                sender,
            } => {
                log::debug!(
                    "{} subscribed to table '{}' state changes",
                    subscriber_id,
                    self.config.name
                );
                self.subscribers.insert(subscriber_id, sender);
            }

            TableMessage::Unsubscribe { subscriber_id } => {
                self.subscribers.remove(&subscriber_id);
                log::debug!(
                    "{} unsubscribed from table '{}' state changes",
                    subscriber_id,
                    self.config.name
                );
            }
        }
    }

    /// Post the cooldown clear back into the inbox once the cooldown elapses.
    fn schedule_cooldown_clear(&self, ticket: CooldownTicket) {
        let sender = self.timer_sender.clone();
        let delay = self.config.grab_cooldown;
        tokio::spawn(async move {
            sleep(delay).await;
            if let Some(sender) = sender.upgrade() {
                let _ = sender.send(TableMessage::CooldownExpired(ticket)).await;
            }
        });
    }

    /// Broadcast state change notification to all subscribers
    fn notify_state_change(&mut self, notification: StateChangeNotification) {
        self.subscribers
            .retain(|subscriber_id, sender| match sender.try_send(notification) {
                Ok(_) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Subscriber {} channel full, dropping notification",
                        subscriber_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", subscriber_id);
                    false
                }
            });
    }
}
