pub mod errors;
mod wire;

use crate::errors::ClientError;
use crate::wire::{Action, RelayResponse};
use common::{Envelope, InMemorySessionCache, InMemoryUserStore, SessionCache, SharedKey, User, UserStore};
use futures_util::{
    stream::{SplitSink, SplitStream},
    SinkExt, StreamExt,
};
use protocol::primitives::{PrivateKey, PublicKey};
use protocol::ratchet::Header as RatchetHeader;
use protocol::session::Session;
use protocol::x3dh::SharedKeyBundle;
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    tungstenite::{Message, Utf8Bytes},
    MaybeTlsStream, WebSocketStream,
};

/// How long [`Client::try_receive_message`] waits for a buffered inbound
/// message before reporting none is available yet.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub const SERVER_URL: &str = "ws://127.0.0.1:3333";

type Sender = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type Receiver = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// One logged-in peer's connection to the relay, its own identity, and the
/// in-flight Double Ratchet sessions it holds with the peers it talks to.
pub struct Client {
    username: String,
    identity: User,
    write: Sender,
    read: Receiver,
    sessions: HashMap<String, Session>,
    session_cache: InMemorySessionCache,
    user_store: InMemoryUserStore,
}

impl Client {
    /// Connects to the relay and generates a fresh identity for `username`.
    /// Does not publish a bundle; call [`Client::register`] for that.
    pub async fn new(username: impl Into<String>) -> Result<Self, ClientError> {
        let username = username.into();
        let (write, read) = Self::connect().await?;
        let user_store = InMemoryUserStore::new();
        let identity = User::generate(username.clone());
        user_store.create(identity.clone()).await?;

        let mut client = Client {
            username,
            identity,
            write,
            read,
            sessions: HashMap::new(),
            session_cache: InMemorySessionCache::new(),
            user_store,
        };
        client.announce().await?;
        Ok(client)
    }

    async fn connect() -> Result<(Sender, Receiver), ClientError> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(SERVER_URL).await?;
        let (write, read) = ws_stream.split();
        Ok((write, read))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Confirms `name` has a published bundle on the relay, without starting
    /// a session yet (that happens lazily on the first [`Client::send_message`]).
    pub async fn lookup_peer(&mut self, name: &str) -> Result<(), ClientError> {
        self.fetch_bundle(name).await.map(|_| ())
    }

    /// This client's own identity, as held in its local keystore.
    pub async fn identity(&self) -> User {
        self.user_store
            .get_by_name(&self.username)
            .await
            .expect("own identity is always present after Client::new")
    }

    /// Tells the relay which username this socket delivers messages for.
    async fn announce(&mut self) -> Result<(), ClientError> {
        self.send_action(&Action::Init {
            user_id: self.username.clone(),
        })
        .await
    }

    /// Publishes this client's signed pre-key bundle so other clients can
    /// run 3DH against it.
    pub async fn register(&mut self) -> Result<(), ClientError> {
        let bundle = SharedKey::from(&self.identity.shared_key_bundle());
        self.send_action(&Action::Register {
            user_id: self.username.clone(),
            bundle,
        })
        .await?;
        self.expect_ack().await
    }

    /// Looks up `name`'s published bundle through the relay.
    async fn fetch_bundle(&mut self, name: &str) -> Result<SharedKeyBundle, ClientError> {
        self.send_action(&Action::GetKeys {
            name: name.to_string(),
        })
        .await?;
        match self.next_response().await? {
            RelayResponse::Keys { bundle } => Ok(SharedKeyBundle::try_from(&bundle)?),
            RelayResponse::Error { .. } => Err(ClientError::UserNotFoundError),
            RelayResponse::Ack => Err(ClientError::ServerResponseError),
        }
    }

    /// Encrypts `plaintext` for `to`, running 3DH first if no session with
    /// `to` exists yet (neither held in memory nor cached), and sends the
    /// resulting envelope through the relay.
    pub async fn send_message(&mut self, to: &str, plaintext: &str) -> Result<(), ClientError> {
        let mut fresh_handshake = None;
        if !self.sessions.contains_key(to) {
            let session = match self.session_cache.load(&self.username, to).await {
                Some(session) => session,
                None => {
                    let bundle = self.fetch_bundle(to).await?;
                    let ek_priv = PrivateKey::new();
                    let mut session = Session::new();
                    session.begin_as_initiator(&self.identity.ik_priv, &ek_priv, &bundle)?;
                    fresh_handshake = Some((PublicKey::from(&self.identity.ik_priv), PublicKey::from(&ek_priv)));
                    session
                }
            };
            self.sessions.insert(to.to_string(), session);
        }

        let session = self.sessions.get_mut(to).expect("just inserted");
        let (header, ciphertext) = session.send(plaintext.as_bytes())?;
        let handshake = fresh_handshake.as_ref().map(|(ik, ek)| (ik, ek));
        let envelope = Envelope::new(&self.username, to, &header, &ciphertext, handshake);

        self.session_cache
            .save(&self.username, to, session.clone())
            .await;
        self.send_envelope(envelope).await
    }

    /// Blocks for the next inbound envelope, decrypts it (running the
    /// responder side of 3DH if it carries a handshake and no session with
    /// its sender exists yet), and returns `(from, plaintext)`.
    pub async fn receive_message(&mut self) -> Result<(String, String), ClientError> {
        loop {
            match self.read.next().await {
                Some(Ok(Message::Text(text))) => {
                    let envelope: Envelope = serde_json::from_str(text.as_str())?;
                    let plaintext = self.decrypt(&envelope).await?;
                    return Ok((envelope.from, plaintext));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(ClientError::from(e)),
                None => return Err(ClientError::ServerResponseError),
            }
        }
    }

    /// Non-blocking variant of [`Client::receive_message`] for callers
    /// running their own event loop (a terminal UI's redraw/input cycle):
    /// returns `None` rather than waiting if nothing has arrived within
    /// [`POLL_INTERVAL`].
    pub async fn try_receive_message(&mut self) -> Option<Result<(String, String), ClientError>> {
        let next = tokio::time::timeout(POLL_INTERVAL, self.read.next()).await;
        match next {
            Ok(Some(Ok(Message::Text(text)))) => {
                let envelope: Envelope = match serde_json::from_str(text.as_str()) {
                    Ok(envelope) => envelope,
                    Err(e) => return Some(Err(ClientError::from(e))),
                };
                let from = envelope.from.clone();
                Some(self.decrypt(&envelope).await.map(|plaintext| (from, plaintext)))
            }
            Ok(Some(Ok(_))) | Err(_) => None,
            Ok(Some(Err(e))) => Some(Err(ClientError::from(e))),
            Ok(None) => Some(Err(ClientError::ServerResponseError)),
        }
    }

    async fn decrypt(&mut self, envelope: &Envelope) -> Result<String, ClientError> {
        let header = RatchetHeader::try_from(&envelope.header)?;

        if !self.sessions.contains_key(&envelope.from) {
            let session = match self.session_cache.load(&self.username, &envelope.from).await {
                Some(session) => session,
                None => {
                    let handshake = envelope
                        .x3dh_handshake
                        .as_ref()
                        .ok_or(ClientError::ServerResponseError)?;
                    let peer_ik_pub = handshake.ik_pub()?;
                    let peer_ek_pub = handshake.ek_pub()?;
                    let mut session = Session::new();
                    session.begin_as_responder(
                        &self.identity.ik_priv,
                        &self.identity.spk_priv,
                        PublicKey::from(&self.identity.spk_priv),
                        &peer_ik_pub,
                        &peer_ek_pub,
                    )?;
                    session
                }
            };
            self.sessions.insert(envelope.from.clone(), session);
        }

        let session = self.sessions.get_mut(&envelope.from).expect("just inserted");
        let plaintext = session.receive(&header, &envelope.ciphertext_bytes()?)?;
        self.session_cache
            .save(&self.username, &envelope.from, session.clone())
            .await;
        Ok(String::from_utf8_lossy(&plaintext).into_owned())
    }

    async fn send_action(&mut self, action: &Action) -> Result<(), ClientError> {
        let payload = serde_json::to_string(action)?;
        self.write.send(Message::Text(Utf8Bytes::from(payload))).await?;
        Ok(())
    }

    async fn send_envelope(&mut self, envelope: Envelope) -> Result<(), ClientError> {
        self.send_action(&Action::Send { envelope }).await
    }

    async fn next_response(&mut self) -> Result<RelayResponse, ClientError> {
        match self.read.next().await {
            Some(Ok(Message::Text(text))) => Ok(serde_json::from_str(text.as_str())?),
            _ => Err(ClientError::ServerResponseError),
        }
    }

    async fn expect_ack(&mut self) -> Result<(), ClientError> {
        match self.next_response().await? {
            RelayResponse::Ack => Ok(()),
            _ => Err(ClientError::ServerResponseError),
        }
    }
}
