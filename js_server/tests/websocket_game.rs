//! End-to-end WebSocket tests against a server bound to a local port.

use futures_util::{SinkExt, StreamExt};
use js_server::api::{AppState, create_router, websocket::ServerMessage};
use jungle_speed::{
    GameStateView, GrabKind, Phase, PlayerId,
    table::{TableActor, TableConfig},
};
use serde_json::{Value, json};
use std::time::Duration;
use tokio::{net::TcpStream, time::timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Start a server with its own table and return the WebSocket URL.
async fn spawn_server(grab_cooldown: Duration) -> String {
    let config = TableConfig {
        grab_cooldown,
        ..TableConfig::default()
    };
    let (actor, table) = TableActor::new(config);
    tokio::spawn(actor.run());

    let app = create_router(AppState { table });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("ws://{addr}/ws")
}

async fn connect(url: &str) -> Ws {
    let (ws, _) = connect_async(url).await.unwrap();
    ws
}

async fn send(ws: &mut Ws, event: Value) {
    ws.send(Message::Text(event.to_string().into())).await.unwrap();
}

async fn next_event(ws: &mut Ws) -> ServerMessage {
    loop {
        let msg = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for an event")
            .expect("socket closed")
            .unwrap();

        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

/// Skip events until one matches.
async fn wait_for(ws: &mut Ws, pred: impl Fn(&ServerMessage) -> bool) -> ServerMessage {
    loop {
        let event = next_event(ws).await;
        if pred(&event) {
            return event;
        }
    }
}

async fn wait_for_state(
    ws: &mut Ws,
    pred: impl Fn(&GameStateView) -> bool,
) -> GameStateView {
    match wait_for(ws, |e| matches!(e, ServerMessage::GameState(view) if pred(view))).await {
        ServerMessage::GameState(view) => view,
        _ => unreachable!(),
    }
}

async fn join(ws: &mut Ws, name: &str) -> PlayerId {
    send(ws, json!({"type": "join_game", "name": name})).await;
    match wait_for(ws, |e| {
        matches!(
            e,
            ServerMessage::JoinedGame { .. } | ServerMessage::JoinFailed { .. }
        )
    })
    .await
    {
        ServerMessage::JoinedGame { player_id } => player_id,
        other => panic!("join rejected: {other:?}"),
    }
}

/// Two seated players with a round dealt. Returns (first seat, second seat).
async fn start_two_player_game(url: &str) -> (Ws, Ws) {
    let mut a = connect(url).await;
    let mut b = connect(url).await;
    join(&mut a, "alice").await;
    join(&mut b, "bob").await;

    send(&mut a, json!({"type": "start_game"})).await;
    for ws in [&mut a, &mut b] {
        wait_for(ws, |e| *e == ServerMessage::GameStarted).await;
        wait_for_state(ws, |view| view.phase == Phase::Playing).await;
    }

    (a, b)
}

// === Lobby Tests ===

#[tokio::test]
async fn test_connect_receives_lobby_snapshot() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let mut ws = connect(&url).await;

    match next_event(&mut ws).await {
        ServerMessage::GameState(view) => {
            assert_eq!(view.phase, Phase::Waiting);
            assert!(view.players.is_empty());
        }
        other => panic!("expected a snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn test_join_broadcasts_to_everyone() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let mut watcher = connect(&url).await;
    let mut player = connect(&url).await;

    let id = join(&mut player, "alice").await;

    let view = wait_for_state(&mut watcher, |view| view.players.len() == 1).await;
    let seat = view.player(&id).expect("joined player is listed");
    assert_eq!(seat.name.to_string(), "alice");
    assert_eq!(seat.draw_deck_count, 0);
}

#[tokio::test]
async fn test_fifth_join_fails() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let mut seated = Vec::new();
    for name in ["a", "b", "c", "d"] {
        let mut ws = connect(&url).await;
        join(&mut ws, name).await;
        seated.push(ws);
    }

    let mut late = connect(&url).await;
    send(&mut late, json!({"type": "join_game", "name": "e"})).await;
    let event = wait_for(&mut late, |e| matches!(e, ServerMessage::JoinFailed { .. })).await;
    assert_eq!(
        event,
        ServerMessage::JoinFailed {
            reason: "game is full".to_string()
        }
    );
}

#[tokio::test]
async fn test_duplicate_join_fails() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let mut ws = connect(&url).await;
    join(&mut ws, "alice").await;

    send(&mut ws, json!({"type": "join_game", "name": "alice"})).await;
    let event = wait_for(&mut ws, |e| matches!(e, ServerMessage::JoinFailed { .. })).await;
    assert_eq!(
        event,
        ServerMessage::JoinFailed {
            reason: "player already joined".to_string()
        }
    );
}

#[tokio::test]
async fn test_start_needs_two_players() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let mut ws = connect(&url).await;
    join(&mut ws, "alice").await;

    send(&mut ws, json!({"type": "start_game"})).await;
    let event = wait_for(&mut ws, |e| matches!(e, ServerMessage::Error { .. })).await;
    assert_eq!(
        event,
        ServerMessage::Error {
            message: "need 2+ players".to_string()
        }
    );
}

#[tokio::test]
async fn test_malformed_message() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let mut ws = connect(&url).await;

    ws.send(Message::Text("not json".into())).await.unwrap();
    let event = wait_for(&mut ws, |e| matches!(e, ServerMessage::Error { .. })).await;
    assert_eq!(
        event,
        ServerMessage::Error {
            message: "Invalid message format".to_string()
        }
    );
}

// === Gameplay Tests ===

#[tokio::test]
async fn test_start_deals_half_deck_each() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let (mut a, _b) = start_two_player_game(&url).await;

    send(&mut a, json!({"type": "draw_card"})).await;
    wait_for(&mut a, |e| matches!(e, ServerMessage::DrawResult(_))).await;

    let view = wait_for_state(&mut a, |view| {
        view.players
            .first()
            .is_some_and(|p| p.active_card.is_some())
    })
    .await;
    assert_eq!(view.players[0].draw_deck_count, 25);
    assert_eq!(view.players[1].draw_deck_count, 26);
    assert_eq!(view.current_player_index, 1);
}

#[tokio::test]
async fn test_draw_result_precedes_its_snapshot() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let (mut a, _b) = start_two_player_game(&url).await;

    send(&mut a, json!({"type": "draw_card"})).await;
    loop {
        match next_event(&mut a).await {
            ServerMessage::DrawResult(result) => {
                assert!(result.success);
                break;
            }
            ServerMessage::GameState(view) => assert!(
                view.players.iter().all(|p| p.active_card.is_none()),
                "snapshot of the draw arrived before the draw result"
            ),
            _ => {}
        }
    }

    let view = wait_for_state(&mut a, |view| view.players[0].active_card.is_some()).await;
    assert_eq!(view.current_player_index, 1);
}

#[tokio::test]
async fn test_draw_out_of_turn() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let (mut a, mut b) = start_two_player_game(&url).await;

    send(&mut b, json!({"type": "draw_card"})).await;
    match wait_for(&mut b, |e| matches!(e, ServerMessage::DrawResult(_))).await {
        ServerMessage::DrawResult(result) => {
            assert!(!result.success);
            assert_eq!(result.reason.as_deref(), Some("not your turn"));
        }
        _ => unreachable!(),
    }

    send(&mut a, json!({"type": "draw_card"})).await;
    match wait_for(&mut a, |e| matches!(e, ServerMessage::DrawResult(_))).await {
        ServerMessage::DrawResult(result) => assert!(result.success),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_grab_by_spectator() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let (_a, _b) = start_two_player_game(&url).await;
    let mut spectator = connect(&url).await;

    send(&mut spectator, json!({"type": "grab_bottle"})).await;
    match wait_for(&mut spectator, |e| matches!(e, ServerMessage::GrabResult(_))).await {
        ServerMessage::GrabResult(result) => {
            assert!(!result.success);
            assert_eq!(result.reason.as_deref(), Some("player not found"));
        }
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_grab_cooldown_expiry_is_pushed() {
    let url = spawn_server(Duration::from_millis(1000)).await;
    let (mut a, mut b) = start_two_player_game(&url).await;

    // Nothing is face up, so any grab is a penalty
    send(&mut a, json!({"type": "grab_bottle"})).await;
    match wait_for(&mut a, |e| matches!(e, ServerMessage::GrabResult(_))).await {
        ServerMessage::GrabResult(result) => {
            assert!(result.success);
            assert_eq!(result.kind, Some(GrabKind::Penalty));
        }
        _ => unreachable!(),
    }

    send(&mut a, json!({"type": "draw_card"})).await;
    match wait_for(&mut a, |e| matches!(e, ServerMessage::DrawResult(_))).await {
        ServerMessage::DrawResult(result) => {
            assert!(!result.success);
            assert_eq!(result.reason.as_deref(), Some("bottle grab cooldown active"));
        }
        _ => unreachable!(),
    }

    // The other player sees the lock and then its release without acting
    wait_for_state(&mut b, |view| view.grab_cooldown_active).await;
    let released = wait_for_state(&mut b, |view| !view.grab_cooldown_active).await;
    assert_eq!(released.phase, Phase::Playing);
    assert!(!released.grab_window_open);

    send(&mut a, json!({"type": "draw_card"})).await;
    match wait_for(&mut a, |e| matches!(e, ServerMessage::DrawResult(_))).await {
        ServerMessage::DrawResult(result) => assert!(result.success),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_disconnect_abandons_round() {
    let url = spawn_server(Duration::from_secs(2)).await;
    let (mut a, mut b) = start_two_player_game(&url).await;

    b.close(None).await.unwrap();

    let view = wait_for_state(&mut a, |view| view.players.len() == 1).await;
    assert_eq!(view.phase, Phase::Waiting);
}
