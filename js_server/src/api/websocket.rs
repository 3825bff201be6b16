//! WebSocket handler carrying the game events.
//!
//! Every connection is one prospective player. The server assigns it a fresh
//! [`PlayerId`], subscribes it to table notifications and pushes a
//! `game_state` snapshot whenever the table changes, including when a grab
//! cooldown expires.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server spawns a send task that runs client commands against the table,
//!    writes their replies and pushes snapshots on every table notification
//! 3. The receive loop parses client events and hands them to the send task
//! 4. On disconnect the player leaves the table
//!
//! # Wire Format
//!
//! Client events are tagged by `type`:
//!
//! ```json
//! {"type": "join_game", "name": "alice"}
//! {"type": "start_game"}
//! {"type": "draw_card"}
//! {"type": "grab_bottle"}
//! ```
//!
//! Server events carry their payload under `data`:
//!
//! ```json
//! {"type": "joined_game", "data": {"playerId": "..."}}
//! {"type": "grab_result", "data": {"success": true, "type": "correct"}}
//! {"type": "game_started"}
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use jungle_speed::{
    DrawResult, GameStateView, GrabResult, PlayerId, PlayerName,
    table::{StateChangeNotification, TableError, TableHandle},
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::AppState;

/// Client events received via WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Take a seat at the table
    JoinGame { name: String },
    /// Deal a new round
    StartGame,
    /// Flip the top card of the draw deck
    DrawCard,
    /// Reach for the bottle
    GrabBottle,
}

/// Events sent to the client
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    JoinedGame {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    JoinFailed {
        reason: String,
    },
    GameStarted,
    DrawResult(DrawResult),
    GrabResult(GrabResult),
    GameState(GameStateView),
    Error {
        message: String,
    },
}

/// Work handed from the receive loop to the send task.
enum Outbound {
    Command(ClientMessage),
    Reply(ServerMessage),
}

impl From<TableError> for ServerMessage {
    fn from(value: TableError) -> Self {
        ServerMessage::Error {
            message: value.to_string(),
        }
    }
}

/// Upgrade HTTP connection to WebSocket.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let player_id = PlayerId::random();
    let (mut sender, mut receiver) = socket.split();

    info!("WebSocket connected: player={}", player_id);

    // Commands run on the send task, so a command's reply is written before
    // the snapshot its notification triggers
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Outbound>(32);
    let (notification_tx, mut notification_rx) = mpsc::channel::<StateChangeNotification>(32);

    if let Err(e) = state
        .table
        .subscribe(player_id.clone(), notification_tx)
        .await
    {
        error!("Failed to subscribe {} to table notifications: {}", player_id, e);
        return;
    }

    let table = state.table.clone();
    let session_id = player_id.clone();
    let send_task = tokio::spawn(async move {
        // A fresh client renders the lobby from this first snapshot
        if !push_state(&table, &mut sender).await {
            return;
        }

        loop {
            tokio::select! {
                Some(notification) = notification_rx.recv() => {
                    if notification == StateChangeNotification::RoundStarted
                        && !send_message(&mut sender, &ServerMessage::GameStarted).await
                    {
                        break;
                    }

                    if !push_state(&table, &mut sender).await {
                        break;
                    }
                }
                Some(outbound) = outbound_rx.recv() => {
                    let reply = match outbound {
                        Outbound::Command(command) => {
                            handle_client_message(command, &session_id, &table).await
                        }
                        Outbound::Reply(reply) => Some(reply),
                    };

                    if let Some(reply) = reply
                        && !send_message(&mut sender, &reply).await
                    {
                        break;
                    }
                }
                else => break,
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                debug!("Received message from {}: {}", player_id, text);

                let outbound = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => Outbound::Command(client_msg),
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        Outbound::Reply(ServerMessage::Error {
                            message: "Invalid message format".to_string(),
                        })
                    }
                };

                if outbound_tx.send(outbound).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: player={}", player_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    // Cleanup - a disconnect is a leave
    send_task.abort();
    let _ = state.table.unsubscribe(player_id.clone()).await;
    if let Err(e) = state.table.leave(player_id.clone()).await {
        warn!("Failed to remove {} on disconnect: {}", player_id, e);
    }

    info!("WebSocket disconnected: player={}", player_id);
}

/// Forward a client event to the table and build the reply for this client.
///
/// A successful `start_game` has no direct reply; every subscriber sees
/// `game_started` through the notification path instead.
async fn handle_client_message(
    msg: ClientMessage,
    player_id: &PlayerId,
    table: &TableHandle,
) -> Option<ServerMessage> {
    let response = match msg {
        ClientMessage::JoinGame { name } => {
            match table
                .join(player_id.clone(), PlayerName::from(name.as_str()))
                .await
            {
                Ok(Ok(())) => {
                    info!("{} joined as {}", player_id, name);
                    ServerMessage::JoinedGame {
                        player_id: player_id.clone(),
                    }
                }
                Ok(Err(e)) => ServerMessage::JoinFailed {
                    reason: e.to_string(),
                },
                Err(e) => e.into(),
            }
        }

        ClientMessage::StartGame => match table.start().await {
            Ok(Ok(())) => return None,
            Ok(Err(e)) => ServerMessage::Error {
                message: e.to_string(),
            },
            Err(e) => e.into(),
        },

        ClientMessage::DrawCard => match table.draw(player_id.clone()).await {
            Ok(result) => ServerMessage::DrawResult(result.into()),
            Err(e) => e.into(),
        },

        ClientMessage::GrabBottle => match table.grab(player_id.clone()).await {
            Ok(result) => ServerMessage::GrabResult(result.into()),
            Err(e) => e.into(),
        },
    };

    Some(response)
}

/// Serialize and send one event. Returns false once the socket is gone.
async fn send_message(sink: &mut SplitSink<WebSocket, Message>, message: &ServerMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            error!("Failed to serialize {:?}: {}", message, e);
            true
        }
    }
}

async fn push_state(table: &TableHandle, sink: &mut SplitSink<WebSocket, Message>) -> bool {
    match table.state().await {
        Ok(view) => send_message(sink, &ServerMessage::GameState(view)).await,
        Err(e) => {
            error!("Failed to fetch table state: {}", e);
            false
        }
    }
}
