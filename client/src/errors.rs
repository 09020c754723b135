use common::CommonError;
use protocol::errors::{RatchetError, X3DHError};
use std::fmt::{Display, Formatter};
use tokio_tungstenite::tungstenite::Error as WsError;

#[derive(Debug)]
pub enum ClientError {
    Connection(WsError),
    Handshake(X3DHError),
    Ratchet(RatchetError),
    Common(CommonError),
    ServerResponseError,
    UserNotFoundError,
    SerializationError,
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Connection(e) => write!(f, "connection error: {}", e),
            ClientError::Handshake(e) => write!(f, "handshake error: {}", e),
            ClientError::Ratchet(e) => write!(f, "ratchet error: {}", e),
            ClientError::Common(e) => write!(f, "{}", e),
            ClientError::ServerResponseError => write!(f, "unexpected or missing relay response"),
            ClientError::UserNotFoundError => write!(f, "user not found"),
            ClientError::SerializationError => write!(f, "serialization error"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<WsError> for ClientError {
    fn from(value: WsError) -> Self {
        ClientError::Connection(value)
    }
}

impl From<X3DHError> for ClientError {
    fn from(value: X3DHError) -> Self {
        ClientError::Handshake(value)
    }
}

impl From<RatchetError> for ClientError {
    fn from(value: RatchetError) -> Self {
        ClientError::Ratchet(value)
    }
}

impl From<CommonError> for ClientError {
    fn from(value: CommonError) -> Self {
        ClientError::Common(value)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(_: serde_json::Error) -> Self {
        ClientError::SerializationError
    }
}
