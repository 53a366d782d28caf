//! End-to-end tests over real WebSocket connections: raw JSON frames
//! in, raw JSON frames out, exactly what a browser client would see.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use holdfast::HoldfastServerBuilder;
use holdfast_registry::NoScoring;
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

type Ws = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

async fn start() -> String {
    let server = HoldfastServerBuilder::new()
        .bind("127.0.0.1:0")
        .build(NoScoring)
        .await
        .expect("server should start");
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

async fn connect(addr: &str) -> Ws {
    let (ws, _) =
        tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
    ws
}

async fn send_json(ws: &mut Ws, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send should succeed");
}

/// Reads the next text frame and parses it, skipping control frames.
async fn recv_json(ws: &mut Ws) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .expect("frame error");
        if msg.is_text() {
            return serde_json::from_str(msg.to_text().unwrap())
                .expect("frame should be JSON");
        }
    }
}

async fn create_room(ws: &mut Ws, username: &str, token: &str) -> String {
    send_json(
        ws,
        json!({
            "type": "CREATE_ROOM",
            "username": username,
            "sessionToken": token,
        }),
    )
    .await;
    let reply = recv_json(ws).await;
    assert_eq!(reply["type"], "ROOM_CREATED");
    reply["room"]["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_room_round_trip() {
    let addr = start().await;
    let mut ws = connect(&addr).await;

    send_json(
        &mut ws,
        json!({
            "type": "CREATE_ROOM",
            "username": "ana",
            "sessionToken": "tok-ana",
        }),
    )
    .await;

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "ROOM_CREATED");
    assert_eq!(reply["room"]["code"].as_str().unwrap().len(), 4);
    assert_eq!(reply["room"]["status"], "WAITING");
    assert_eq!(reply["player"]["username"], "ana");
    assert_eq!(reply["player"]["isHost"], true);
}

#[tokio::test]
async fn test_join_flow_broadcasts_to_host() {
    let addr = start().await;
    let mut host = connect(&addr).await;
    let mut guest = connect(&addr).await;

    let code = create_room(&mut host, "ana", "tok-ana").await;

    send_json(
        &mut guest,
        json!({
            "type": "JOIN_ROOM",
            "roomCode": code.to_lowercase(),
            "username": "bo",
            "sessionToken": "tok-bo",
        }),
    )
    .await;

    let reply = recv_json(&mut guest).await;
    assert_eq!(reply["type"], "JOIN_SUCCESS");
    assert_eq!(reply["room"]["code"], code.as_str());
    assert_eq!(reply["player"]["isHost"], false);

    let update = recv_json(&mut host).await;
    assert_eq!(update["type"], "PLAYER_UPDATE");
    assert_eq!(update["event"], "JOINED");
    assert_eq!(update["players"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_frame_reports_error_and_keeps_connection() {
    let addr = start().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::Text("this is not json".into()))
        .await
        .unwrap();
    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "ERROR");
    assert_eq!(reply["code"], "INVALID_PAYLOAD");

    // The connection survives a bad frame.
    let code = create_room(&mut ws, "ana", "tok-ana").await;
    assert_eq!(code.len(), 4);
}

#[tokio::test]
async fn test_refusals_come_back_as_error_events() {
    let addr = start().await;
    let mut ws = connect(&addr).await;

    send_json(
        &mut ws,
        json!({
            "type": "JOIN_ROOM",
            "roomCode": "ZZZZ",
            "username": "bo",
            "sessionToken": "tok-bo",
        }),
    )
    .await;

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "ERROR");
    assert_eq!(reply["code"], "ROOM_NOT_FOUND");
}

#[tokio::test]
async fn test_socket_close_and_reconnect_recovers_seat() {
    let addr = start().await;
    let mut host = connect(&addr).await;
    let mut guest = connect(&addr).await;

    let code = create_room(&mut host, "ana", "tok-ana").await;
    send_json(
        &mut guest,
        json!({
            "type": "JOIN_ROOM",
            "roomCode": code.as_str(),
            "username": "bo",
            "sessionToken": "tok-bo",
        }),
    )
    .await;
    assert_eq!(recv_json(&mut guest).await["type"], "JOIN_SUCCESS");
    assert_eq!(recv_json(&mut host).await["event"], "JOINED");

    // Bo's socket drops.
    guest.close(None).await.unwrap();
    let update = recv_json(&mut host).await;
    assert_eq!(update["type"], "PLAYER_UPDATE");
    assert_eq!(update["event"], "DISCONNECTED");
    assert_eq!(update["affectedPlayerId"], "tok-bo");

    // A fresh socket with the same session token recovers the seat;
    // no username needed.
    let mut returned = connect(&addr).await;
    send_json(
        &mut returned,
        json!({
            "type": "JOIN_ROOM",
            "roomCode": code.as_str(),
            "sessionToken": "tok-bo",
        }),
    )
    .await;

    let reply = recv_json(&mut returned).await;
    assert_eq!(reply["type"], "RECONNECT_SUCCESS");
    assert_eq!(reply["player"]["username"], "bo");
    assert_eq!(reply["player"]["isOnline"], true);
    assert!(reply["message"].as_str().unwrap().contains("lobby"));

    let update = recv_json(&mut host).await;
    assert_eq!(update["event"], "RECONNECTED");
}

#[tokio::test]
async fn test_game_lifecycle_over_websocket() {
    let addr = start().await;
    let mut host = connect(&addr).await;
    let mut guest = connect(&addr).await;

    let code = create_room(&mut host, "ana", "tok-ana").await;
    send_json(
        &mut guest,
        json!({
            "type": "JOIN_ROOM",
            "roomCode": code.as_str(),
            "username": "bo",
            "sessionToken": "tok-bo",
        }),
    )
    .await;
    assert_eq!(recv_json(&mut guest).await["type"], "JOIN_SUCCESS");
    assert_eq!(recv_json(&mut host).await["event"], "JOINED");

    // Only the host can start.
    send_json(
        &mut guest,
        json!({
            "type": "START_GAME",
            "roomCode": code.as_str(),
            "sessionToken": "tok-bo",
        }),
    )
    .await;
    let refused = recv_json(&mut guest).await;
    assert_eq!(refused["type"], "ERROR");
    assert_eq!(refused["code"], "NOT_HOST");

    send_json(
        &mut host,
        json!({
            "type": "START_GAME",
            "roomCode": code.as_str(),
            "sessionToken": "tok-ana",
        }),
    )
    .await;
    for ws in [&mut host, &mut guest] {
        let started = recv_json(ws).await;
        assert_eq!(started["type"], "GAME_STARTED");
        assert_eq!(started["round"], 1);
        assert_eq!(started["room"]["status"], "PLAYING");
    }
}
