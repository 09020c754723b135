//! This module defines the custom error types used throughout the cryptographic protocol implementation.
//! It provides two main error enums: `X3DHError` for errors specific to the X3DH key agreement protocol,
//! and `RatchetError` for errors encountered during the Double Ratchet message encryption protocol.
//! These enums ensure precise error reporting and handling for various cryptographic operations.

use aes::cipher::crypto_common;
use ed25519_dalek::SignatureError;
use std::fmt::{Display, Formatter};

/// Represents errors that can occur during the X3DH key agreement protocol.
#[derive(Debug)]
pub enum X3DHError {
    /// Error occurring during signature verification with Ed25519.
    InvalidSignature(SignatureError),

    /// Error indicating an invalid key material length during HKDF key derivation.
    HkdfInvalidLengthError(hkdf::InvalidLength),

    /// Error indicating an invalid length for AES-GCM encryption or decryption.
    AesGcmInvalidLength(crypto_common::InvalidLength),

    /// General AES-GCM encryption or decryption error (including a failed tag check).
    AesGcmError(aes_gcm::Error),

    /// Error occurring during Base64 decoding of encoded data.
    Base64DecodeError(base64::DecodeError),

    /// Error indicating that a [`crate::x3dh::SharedKeyBundle`] is invalid, unsigned, or corrupted.
    InvalidPreKeyBundle,

    /// Error indicating an invalid or corrupted [`crate::primitives::PrivateKey`].
    InvalidPrivateKey,

    /// Error indicating an invalid or corrupted [`crate::primitives::PublicKey`].
    InvalidPublicKey,

    /// A Diffie-Hellman input public key was all-zero (or otherwise contributory / low-order).
    ContributoryKey,
}

impl Display for X3DHError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self {
            X3DHError::InvalidSignature(e) => write!(f, "Invalid signature: {}", e),
            X3DHError::HkdfInvalidLengthError(e) => write!(f, "Invalid length: {}", e),
            X3DHError::AesGcmError(e) => write!(f, "AES GCM error: {}", e),
            X3DHError::AesGcmInvalidLength(e) => write!(f, "Invalid length: {}", e),
            X3DHError::Base64DecodeError(e) => write!(f, "Base64 decode error: {}", e),
            X3DHError::InvalidPreKeyBundle => write!(f, "Invalid prekey bundle"),
            X3DHError::InvalidPrivateKey => write!(f, "Invalid private key"),
            X3DHError::InvalidPublicKey => write!(f, "Invalid public key"),
            X3DHError::ContributoryKey => write!(f, "Diffie-Hellman input key is contributory"),
        }
    }
}

impl std::error::Error for X3DHError {}

impl From<hkdf::InvalidLength> for X3DHError {
    fn from(value: hkdf::InvalidLength) -> Self {
        X3DHError::HkdfInvalidLengthError(value)
    }
}

impl From<ed25519_dalek::SignatureError> for X3DHError {
    fn from(value: ed25519_dalek::SignatureError) -> Self {
        X3DHError::InvalidSignature(value)
    }
}

impl From<aes_gcm::Error> for X3DHError {
    fn from(value: aes_gcm::Error) -> Self {
        X3DHError::AesGcmError(value)
    }
}

impl From<crypto_common::InvalidLength> for X3DHError {
    fn from(value: crypto_common::InvalidLength) -> Self {
        X3DHError::AesGcmInvalidLength(value)
    }
}

impl From<base64::DecodeError> for X3DHError {
    fn from(value: base64::DecodeError) -> Self {
        X3DHError::Base64DecodeError(value)
    }
}

/// Represents errors that can occur during the Double Ratchet protocol.
///
/// Maps onto the four error kinds the core is specified to produce:
/// `CryptoFailure`, `SkipLimitExceeded`, `MissingPrerequisite`, `DecodeFailure`.
#[derive(Debug)]
pub enum RatchetError {
    /// The underlying DH, KDF, or AEAD primitive failed (including an AEAD tag mismatch
    /// on `Receive`). Fatal for the current operation.
    CryptoFailure(X3DHError),

    /// A single `Receive` would require minting more than `MAX_SKIP` keys, or doing so
    /// would exceed the global cap on stored skipped keys.
    SkipLimitExceeded,

    /// `Send` was called before `DHr` is known, or `Receive`/skip-generation was called
    /// without a receiving chain key and the header does not trigger a ratchet.
    MissingPrerequisite,

    /// Malformed header or short ciphertext, rejected before touching ratchet state.
    DecodeFailure(String),
}

impl Display for RatchetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self {
            RatchetError::CryptoFailure(e) => write!(f, "Crypto failure: {}", e),
            RatchetError::SkipLimitExceeded => write!(f, "Max skipped-message keys exceeded"),
            RatchetError::MissingPrerequisite => write!(f, "Missing ratchet prerequisite"),
            RatchetError::DecodeFailure(e) => write!(f, "Decode failure: {}", e),
        }
    }
}

impl std::error::Error for RatchetError {}

impl From<hkdf::InvalidLength> for RatchetError {
    fn from(value: hkdf::InvalidLength) -> Self {
        RatchetError::CryptoFailure(X3DHError::from(value))
    }
}

impl From<X3DHError> for RatchetError {
    fn from(value: X3DHError) -> Self {
        RatchetError::CryptoFailure(value)
    }
}
