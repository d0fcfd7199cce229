// In-process relay server standing in for the session authority in integration tests.
#![allow(dead_code)]

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use sync_client::interface_adapters::protocol::{
    ClientMessage, IdentityDto, PoseDto, ServerMessage,
};
use tokio::sync::mpsc;

struct Peer {
    // Last pose reported by this connection, if any.
    pose: Option<PoseDto>,
    // Outbound frames for this connection's writer task.
    tx: mpsc::UnboundedSender<String>,
}

#[derive(Clone, Default)]
struct Relay {
    // Connected peers keyed by their assigned id.
    peers: Arc<Mutex<HashMap<String, Peer>>>,
    // Every parsed client message, tagged with the sending connection's id.
    received: Arc<Mutex<Vec<(String, ClientMessage)>>>,
}

impl Relay {
    fn broadcast(&self, message: &ServerMessage) {
        let text = serde_json::to_string(message).expect("encode server message");
        let peers = self.peers.lock().expect("peers mutex poisoned");
        for peer in peers.values() {
            let _ = peer.tx.send(text.clone());
        }
    }

    // Fan out every known pose to every peer, the same way the session server does.
    fn broadcast_snapshot(&self) {
        let snapshot: HashMap<String, PoseDto> = {
            let peers = self.peers.lock().expect("peers mutex poisoned");
            peers
                .iter()
                .filter_map(|(id, peer)| peer.pose.clone().map(|pose| (id.clone(), pose)))
                .collect()
        };
        self.broadcast(&ServerMessage::Move(snapshot));
    }
}

pub struct RelayServer {
    // Base address, e.g. ws://127.0.0.1:PORT
    pub base_url: String,
    relay: Relay,
}

impl RelayServer {
    // Assigns an identity and relays moves/shoots.
    pub fn ws_url(&self) -> String {
        format!("{}/ws", self.base_url)
    }

    // Accepts the upgrade but never sends an identity.
    pub fn silent_url(&self) -> String {
        format!("{}/silent", self.base_url)
    }

    // Sends an identity, then closes the session.
    pub fn drop_url(&self) -> String {
        format!("{}/drop", self.base_url)
    }

    // Identity, then a snapshot listing that identity and one other peer, then close.
    pub fn late_snapshot_url(&self) -> String {
        format!("{}/late", self.base_url)
    }

    // A snapshot listing the client before its identity arrives, then close.
    pub fn early_snapshot_url(&self) -> String {
        format!("{}/early", self.base_url)
    }

    pub fn received(&self) -> Vec<(String, ClientMessage)> {
        self.relay
            .received
            .lock()
            .expect("received mutex poisoned")
            .clone()
    }

    pub fn moves_from(&self, id: &str) -> usize {
        self.received()
            .iter()
            .filter(|(sender, message)| sender == id && matches!(message, ClientMessage::Move(_)))
            .count()
    }

    pub fn peer_count(&self) -> usize {
        self.relay.peers.lock().expect("peers mutex poisoned").len()
    }
}

// Boot a relay on an ephemeral port inside the current test runtime.
pub async fn spawn_relay() -> RelayServer {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");

    let relay = Relay::default();
    let app = Router::new()
        .route("/ws", get(relay_handler))
        .route("/silent", get(silent_handler))
        .route("/drop", get(drop_handler))
        .route("/late", get(late_snapshot_handler))
        .route("/early", get(early_snapshot_handler))
        .with_state(relay.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("relay server failed");
    });

    RelayServer {
        base_url: format!("ws://{addr}"),
        relay,
    }
}

async fn relay_handler(ws: WebSocketUpgrade, State(relay): State<Relay>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_peer(socket, relay))
}

async fn silent_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        // Drain until the client goes away.
        while let Some(Ok(_)) = socket.recv().await {}
    })
}

async fn drop_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        let identity = ServerMessage::Identity(IdentityDto {
            id: "short-lived".to_string(),
        });
        let text = serde_json::to_string(&identity).expect("encode identity");
        let _ = socket.send(Message::Text(text.into())).await;
        let _ = socket.close().await;
    })
}

// Id assigned by the scripted endpoints, and the other peer they report.
pub const SCRIPTED_SELF_ID: &str = "scripted-self";
pub const SCRIPTED_PEER_ID: &str = "scripted-peer";

fn scripted_identity() -> ServerMessage {
    ServerMessage::Identity(IdentityDto {
        id: SCRIPTED_SELF_ID.to_string(),
    })
}

fn scripted_snapshot() -> ServerMessage {
    let pose = |x: f32| PoseDto {
        position: [x, 0.0, 0.0],
        rotation: [0.0; 3],
    };
    ServerMessage::Move(HashMap::from([
        (SCRIPTED_SELF_ID.to_string(), pose(0.0)),
        (SCRIPTED_PEER_ID.to_string(), pose(4.0)),
    ]))
}

async fn send_then_close(mut socket: WebSocket, script: Vec<ServerMessage>) {
    for message in script {
        let text = serde_json::to_string(&message).expect("encode scripted message");
        if socket.send(Message::Text(text.into())).await.is_err() {
            return;
        }
    }
    let _ = socket.close().await;
}

async fn late_snapshot_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|socket| {
        send_then_close(socket, vec![scripted_identity(), scripted_snapshot()])
    })
}

async fn early_snapshot_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|socket| {
        send_then_close(socket, vec![scripted_snapshot(), scripted_identity()])
    })
}

async fn handle_peer(socket: WebSocket, relay: Relay) {
    let id = uuid::Uuid::new_v4().to_string();
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Identity goes out before the peer can receive any broadcast.
    let identity = ServerMessage::Identity(IdentityDto { id: id.clone() });
    let _ = tx.send(serde_json::to_string(&identity).expect("encode identity"));
    relay
        .peers
        .lock()
        .expect("peers mutex poisoned")
        .insert(id.clone(), Peer { pose: None, tx });

    let writer = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = stream.next().await {
        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let Ok(parsed) = serde_json::from_str::<ClientMessage>(text.as_str()) else {
            continue;
        };
        relay
            .received
            .lock()
            .expect("received mutex poisoned")
            .push((id.clone(), parsed.clone()));

        match parsed {
            ClientMessage::Move(update) => {
                if let Some(peer) = relay
                    .peers
                    .lock()
                    .expect("peers mutex poisoned")
                    .get_mut(&update.id)
                {
                    peer.pose = Some(PoseDto {
                        position: update.position,
                        rotation: update.rotation,
                    });
                }
                relay.broadcast_snapshot();
            }
            ClientMessage::Shoot(shot) => relay.broadcast(&ServerMessage::Shoot(shot)),
        }
    }

    relay
        .peers
        .lock()
        .expect("peers mutex poisoned")
        .remove(&id);
    relay.broadcast_snapshot();
    writer.abort();
}
