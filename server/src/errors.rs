use common::CommonError;
use std::fmt::Display;
use tokio_tungstenite::tungstenite::Error as WsError;

#[derive(Debug)]
pub(crate) enum ServerError {
    Connection(WsError),
    Json(serde_json::Error),
    Common(CommonError),
    InvalidRequest,
}

impl Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Connection(e) => write!(f, "connection error: {}", e),
            ServerError::Json(e) => write!(f, "malformed message: {}", e),
            ServerError::Common(e) => write!(f, "{}", e),
            ServerError::InvalidRequest => write!(f, "invalid request"),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<WsError> for ServerError {
    fn from(value: WsError) -> Self {
        ServerError::Connection(value)
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(value: serde_json::Error) -> Self {
        ServerError::Json(value)
    }
}

impl From<CommonError> for ServerError {
    fn from(value: CommonError) -> Self {
        ServerError::Common(value)
    }
}
