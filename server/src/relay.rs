use crate::errors::ServerError;
use common::{Envelope, SharedKey};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

pub(crate) type Tx = mpsc::UnboundedSender<Message>;
pub(crate) type PeerMap = Arc<RwLock<HashMap<String, Tx>>>;
pub(crate) type OfflineBuffer = Arc<RwLock<HashMap<String, Vec<Envelope>>>>;
pub(crate) type KeyDirectory = Arc<RwLock<HashMap<String, SharedKey>>>;

/// A request multiplexed over a single WebSocket connection, in the style of
/// the original `Action` enum: connection setup, bundle publication, bundle
/// lookup, and message relay all share one channel per peer.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(crate) enum Action {
    /// Registers this socket as the inbound channel for `user_id`, flushing
    /// any envelopes buffered while it was offline.
    Init { user_id: String },
    /// Publishes (or replaces) `user_id`'s signed key bundle.
    Register { user_id: String, bundle: SharedKey },
    /// Looks up another user's published bundle.
    GetKeys { name: String },
    /// Relays an envelope to its recipient, buffering it if offline.
    Send {
        #[serde(flatten)]
        envelope: Envelope,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum RelayResponse {
    Ack,
    Keys { bundle: SharedKey },
    Error { message: String },
}

impl Action {
    fn parse(text: &str) -> Result<Action, ServerError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// The WebSocket relay: holds the connected peers, the offline delivery
/// buffer, and the directory of published key bundles.
#[derive(Clone)]
pub struct Relay {
    ip: String,
    port: String,
    peers: PeerMap,
    offline: OfflineBuffer,
    keys: KeyDirectory,
}

impl Relay {
    pub fn new(ip: String, port: String) -> Relay {
        Relay {
            ip,
            port,
            peers: Arc::new(RwLock::new(HashMap::new())),
            offline: Arc::new(RwLock::new(HashMap::new())),
            keys: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn listen(&self) {
        let addr = format!("{}:{}", self.ip, self.port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("failed to bind {}: {}", addr, e);
                return;
            }
        };
        info!("relay listening on {}", addr);

        loop {
            let (stream, peer_addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("failed to accept connection: {}", e);
                    continue;
                }
            };
            let peers = self.peers.clone();
            let offline = self.offline.clone();
            let keys = self.keys.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peers, offline, keys).await {
                    error!("connection from {} ended with error: {}", peer_addr, e);
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peers: PeerMap,
    offline: OfflineBuffer,
    keys: KeyDirectory,
) -> Result<(), ServerError> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let user_id = match read.next().await {
        Some(Ok(Message::Text(text))) => match Action::parse(text.as_str())? {
            Action::Init { user_id } => user_id,
            _ => return Err(ServerError::InvalidRequest),
        },
        _ => return Err(ServerError::InvalidRequest),
    };

    let (tx, rx) = mpsc::unbounded_channel();
    peers.write().await.insert(user_id.clone(), tx);
    send_response(&mut write, &RelayResponse::Ack).await?;
    flush_offline(&user_id, &offline, &mut write).await?;

    let forward_task = tokio::spawn(forward_outbound(rx, write));

    let result = process_inbound(&user_id, &mut read, &peers, &offline, &keys).await;

    peers.write().await.remove(&user_id);
    forward_task.abort();
    result
}

async fn process_inbound(
    user_id: &str,
    read: &mut SplitStream<WebSocketStream<TcpStream>>,
    peers: &PeerMap,
    offline: &OfflineBuffer,
    keys: &KeyDirectory,
) -> Result<(), ServerError> {
    while let Some(message) = read.next().await {
        let text = match message? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let action = match Action::parse(text.as_str()) {
            Ok(action) => action,
            Err(e) => {
                warn!("{}: malformed request: {}", user_id, e);
                continue;
            }
        };
        match action {
            Action::Init { .. } => warn!("{}: unexpected repeated Init", user_id),
            Action::Register { user_id, bundle } => {
                keys.write().await.insert(user_id, bundle);
            }
            Action::GetKeys { name } => {
                let response = match keys.read().await.get(&name) {
                    Some(bundle) => RelayResponse::Keys {
                        bundle: bundle.clone(),
                    },
                    None => RelayResponse::Error {
                        message: format!("no published bundle for {}", name),
                    },
                };
                send_to(peers, user_id, &response).await?;
            }
            Action::Send { envelope } => route_or_buffer(envelope, peers, offline).await?,
        }
    }
    Ok(())
}

/// Routes `envelope` directly to its recipient's socket if connected,
/// otherwise appends it to the recipient's FIFO offline buffer.
pub(crate) async fn route_or_buffer(
    envelope: Envelope,
    peers: &PeerMap,
    offline: &OfflineBuffer,
) -> Result<(), ServerError> {
    let delivered = {
        let peers_guard = peers.read().await;
        match peers_guard.get(&envelope.to) {
            Some(tx) => {
                let payload = serde_json::to_string(&envelope)?;
                tx.send(Message::Text(payload.into())).is_ok()
            }
            None => false,
        }
    };
    if !delivered {
        offline
            .write()
            .await
            .entry(envelope.to.clone())
            .or_default()
            .push(envelope);
    }
    Ok(())
}

async fn flush_offline(
    user_id: &str,
    offline: &OfflineBuffer,
    write: &mut SplitSink<WebSocketStream<TcpStream>, Message>,
) -> Result<(), ServerError> {
    let pending = offline.write().await.remove(user_id);
    if let Some(pending) = pending {
        for envelope in pending {
            let payload = serde_json::to_string(&envelope)?;
            write.send(Message::Text(payload.into())).await?;
        }
    }
    Ok(())
}

async fn forward_outbound(
    mut rx: mpsc::UnboundedReceiver<Message>,
    mut write: SplitSink<WebSocketStream<TcpStream>, Message>,
) {
    while let Some(message) = rx.recv().await {
        if write.send(message).await.is_err() {
            break;
        }
    }
}

async fn send_to(
    peers: &PeerMap,
    user_id: String,
    response: &RelayResponse,
) -> Result<(), ServerError> {
    if let Some(tx) = peers.read().await.get(&user_id) {
        let payload = serde_json::to_string(response)?;
        let _ = tx.send(Message::Text(payload.into()));
    }
    Ok(())
}

async fn send_response(
    write: &mut SplitSink<WebSocketStream<TcpStream>, Message>,
    response: &RelayResponse,
) -> Result<(), ServerError> {
    let payload = serde_json::to_string(response)?;
    write.send(Message::Text(payload.into())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::primitives::{PrivateKey, PublicKey};
    use protocol::ratchet::Header;

    fn sample_envelope(to: &str) -> Envelope {
        let header = Header {
            dh_pub: PublicKey::from(&PrivateKey::new()),
            msg_num: 0,
            prev_chain_len: 0,
        };
        Envelope::new("alice", to, &header, b"hi", None)
    }

    #[tokio::test]
    async fn routes_directly_to_a_connected_peer() {
        let peers: PeerMap = Arc::new(RwLock::new(HashMap::new()));
        let offline: OfflineBuffer = Arc::new(RwLock::new(HashMap::new()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        peers.write().await.insert("bob".to_string(), tx);

        route_or_buffer(sample_envelope("bob"), &peers, &offline)
            .await
            .unwrap();

        assert!(rx.recv().await.is_some());
        assert!(offline.read().await.is_empty());
    }

    #[tokio::test]
    async fn buffers_for_an_offline_peer() {
        let peers: PeerMap = Arc::new(RwLock::new(HashMap::new()));
        let offline: OfflineBuffer = Arc::new(RwLock::new(HashMap::new()));

        route_or_buffer(sample_envelope("bob"), &peers, &offline)
            .await
            .unwrap();

        let guard = offline.read().await;
        assert_eq!(guard.get("bob").map(Vec::len), Some(1));
    }

    #[test]
    fn action_parses_send_with_flattened_envelope() {
        let envelope = sample_envelope("bob");
        let mut json = serde_json::to_value(&envelope).unwrap();
        json["action"] = serde_json::Value::String("send".to_string());
        let action: Action = serde_json::from_value(json).unwrap();
        assert!(matches!(action, Action::Send { envelope } if envelope.to == "bob"));
    }
}
