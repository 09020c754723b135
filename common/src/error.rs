//! A small error type for the ambient wire-format and storage concerns the
//! `common` crate owns: base64/JSON decoding and lookups against the user
//! store, layered over the core's own [`RatchetError`]/[`X3DHError`].

use protocol::errors::{RatchetError, X3DHError};
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CommonError {
    Crypto(RatchetError),
    Handshake(X3DHError),
    Base64DecodeError(base64::DecodeError),
    Json(serde_json::Error),
    Toml(toml::de::Error),
    UnknownUser(String),
    UserAlreadyExists(String),
}

impl Display for CommonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CommonError::Crypto(e) => write!(f, "Ratchet error: {}", e),
            CommonError::Handshake(e) => write!(f, "X3DH error: {}", e),
            CommonError::Base64DecodeError(e) => write!(f, "Base64 decode error: {}", e),
            CommonError::Json(e) => write!(f, "JSON error: {}", e),
            CommonError::Toml(e) => write!(f, "TOML error: {}", e),
            CommonError::UnknownUser(name) => write!(f, "Unknown user: {}", name),
            CommonError::UserAlreadyExists(name) => write!(f, "User already exists: {}", name),
        }
    }
}

impl std::error::Error for CommonError {}

impl From<RatchetError> for CommonError {
    fn from(value: RatchetError) -> Self {
        CommonError::Crypto(value)
    }
}

impl From<X3DHError> for CommonError {
    fn from(value: X3DHError) -> Self {
        CommonError::Handshake(value)
    }
}

impl From<base64::DecodeError> for CommonError {
    fn from(value: base64::DecodeError) -> Self {
        CommonError::Base64DecodeError(value)
    }
}

impl From<serde_json::Error> for CommonError {
    fn from(value: serde_json::Error) -> Self {
        CommonError::Json(value)
    }
}

impl From<toml::de::Error> for CommonError {
    fn from(value: toml::de::Error) -> Self {
        CommonError::Toml(value)
    }
}
