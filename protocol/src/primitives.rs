//! Fundamental cryptographic building blocks used by the X3DH handshake and the
//! Double Ratchet: Curve25519 keys, the shared-secret and message-key newtypes,
//! Ed25519 signing (reserved for authenticating a published signed pre-key), and
//! the single AES-256-GCM AEAD wrapper both layers encrypt and decrypt through.

use crate::constants::{
    AES256_NONCE_LENGTH, AES256_SECRET_LENGTH, CURVE25519_PUBLIC_LENGTH, CURVE25519_SECRET_LENGTH,
    SIGNATURE_LENGTH,
};
use crate::errors::X3DHError;
use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use arrayref::array_ref;
use base64::{engine::general_purpose, Engine as _};
use ed25519_dalek::ed25519::signature::SignerMut;
use ed25519_dalek::Verifier;
use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::hash::{Hash, Hasher};
use x25519_dalek::StaticSecret;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A Curve25519 private key used for Diffie-Hellman key exchange.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; CURVE25519_SECRET_LENGTH]);

impl PrivateKey {
    /// Samples a new private scalar from a cryptographically secure RNG.
    pub fn new() -> PrivateKey {
        let key = StaticSecret::random_from_rng(&mut OsRng);
        PrivateKey(key.to_bytes())
    }

    /// Performs Curve25519 scalar multiplication against `public_key`.
    ///
    /// # Errors
    ///
    /// * [`X3DHError::ContributoryKey`] - if `public_key` is the all-zero sentinel
    ///   (or otherwise a known low-order point), which would yield a predictable
    ///   shared secret.
    pub fn diffie_hellman(&self, public_key: &PublicKey) -> Result<SharedSecret, X3DHError> {
        if public_key.0 == [0u8; CURVE25519_PUBLIC_LENGTH] {
            return Err(X3DHError::ContributoryKey);
        }
        let dalek_private_key = StaticSecret::from(self.0);
        let dalek_public_key = x25519_dalek::PublicKey::from(public_key.0);
        let shared_secret = dalek_private_key.diffie_hellman(&dalek_public_key);
        if shared_secret.was_contributory() {
            return Err(X3DHError::ContributoryKey);
        }
        Ok(SharedSecret(shared_secret.to_bytes()))
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    pub fn from_base64(value: &str) -> Result<PrivateKey, X3DHError> {
        let bytes = general_purpose::STANDARD.decode(value)?;
        if bytes.len() != CURVE25519_SECRET_LENGTH {
            return Err(X3DHError::InvalidPrivateKey);
        }
        let mut arr = [0u8; CURVE25519_SECRET_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(PrivateKey(arr))
    }
}

impl AsRef<[u8; CURVE25519_SECRET_LENGTH]> for PrivateKey {
    fn as_ref(&self) -> &[u8; CURVE25519_SECRET_LENGTH] {
        &self.0
    }
}

/// A Curve25519 public key: an identity key, a signed pre-key, an ephemeral key,
/// or a ratchet public key, depending on context.
#[derive(Clone, Debug, Eq, Serialize, Deserialize)]
pub struct PublicKey(pub(crate) [u8; CURVE25519_PUBLIC_LENGTH]);

impl PublicKey {
    /// The all-zero sentinel used by the initiator's not-yet-ratcheted `DHs`.
    pub fn zero() -> PublicKey {
        PublicKey([0u8; CURVE25519_PUBLIC_LENGTH])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; CURVE25519_PUBLIC_LENGTH]
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    pub fn from_base64(value: &str) -> Result<PublicKey, X3DHError> {
        let bytes = general_purpose::STANDARD.decode(value)?;
        if bytes.len() != CURVE25519_PUBLIC_LENGTH {
            return Err(X3DHError::InvalidPublicKey);
        }
        let mut arr = [0u8; CURVE25519_PUBLIC_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(PublicKey(arr))
    }
}

impl From<&PrivateKey> for PublicKey {
    fn from(private_key: &PrivateKey) -> PublicKey {
        let dalek_private_key = x25519_dalek::StaticSecret::from(private_key.0);
        let dalek_public_key = x25519_dalek::PublicKey::from(&dalek_private_key);
        PublicKey(dalek_public_key.to_bytes())
    }
}

impl From<[u8; CURVE25519_PUBLIC_LENGTH]> for PublicKey {
    fn from(value: [u8; CURVE25519_PUBLIC_LENGTH]) -> PublicKey {
        PublicKey(value)
    }
}

impl From<&[u8; CURVE25519_PUBLIC_LENGTH]> for PublicKey {
    fn from(value: &[u8; CURVE25519_PUBLIC_LENGTH]) -> PublicKey {
        PublicKey(*value)
    }
}

impl AsRef<[u8; CURVE25519_PUBLIC_LENGTH]> for PublicKey {
    fn as_ref(&self) -> &[u8; CURVE25519_PUBLIC_LENGTH] {
        &self.0
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// A 256-bit secret shared between two parties after a Diffie-Hellman key
/// agreement, a 3DH handshake, or a root-/chain-KDF step.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(pub(crate) [u8; AES256_SECRET_LENGTH]);

impl From<[u8; AES256_SECRET_LENGTH]> for SharedSecret {
    fn from(value: [u8; AES256_SECRET_LENGTH]) -> SharedSecret {
        SharedSecret(value)
    }
}

impl AsRef<[u8; AES256_SECRET_LENGTH]> for SharedSecret {
    fn as_ref(&self) -> &[u8; AES256_SECRET_LENGTH] {
        &self.0
    }
}

/// A one-shot 32-byte AEAD key minted by the ratchet's chain KDF for exactly
/// one message, in either direction.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct MessageKey([u8; AES256_SECRET_LENGTH]);

impl From<[u8; AES256_SECRET_LENGTH]> for MessageKey {
    fn from(value: [u8; AES256_SECRET_LENGTH]) -> MessageKey {
        MessageKey(value)
    }
}

impl MessageKey {
    /// Encrypts `plaintext` under this key with AES-256-GCM, binding `aad`.
    /// Returns `nonce(12) || ciphertext_with_tag`, per the wire contract.
    pub fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>, X3DHError> {
        let cipher = Aes256Gcm::new_from_slice(&self.0)?;
        let mut nonce_bytes = [0u8; AES256_NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let payload = Payload { aad, msg: plaintext };
        let ciphertext = cipher.encrypt(nonce, payload)?;
        let mut out = Vec::with_capacity(AES256_NONCE_LENGTH + ciphertext.len());
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypts `nonce || ciphertext_with_tag`, verifying `aad`.
    ///
    /// # Errors
    ///
    /// * [`X3DHError::InvalidPreKeyBundle`] is never returned here; a short buffer
    ///   or a failed tag check both surface as [`X3DHError::AesGcmError`].
    pub fn decrypt(&self, nonce_and_ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>, X3DHError> {
        if nonce_and_ciphertext.len() < AES256_NONCE_LENGTH {
            return Err(X3DHError::AesGcmError(aes_gcm::Error));
        }
        let cipher = Aes256Gcm::new_from_slice(&self.0)?;
        let nonce = Nonce::from_slice(&nonce_and_ciphertext[..AES256_NONCE_LENGTH]);
        let payload = Payload {
            aad,
            msg: &nonce_and_ciphertext[AES256_NONCE_LENGTH..],
        };
        Ok(cipher.decrypt(nonce, payload)?)
    }
}

/// An Ed25519 signing key, derived from a Curve25519 identity private key,
/// used to authenticate a published signed pre-key.
pub(crate) struct SigningKey(ed25519_dalek::SigningKey);

impl SigningKey {
    pub(crate) fn from_identity(ik: &PrivateKey) -> SigningKey {
        SigningKey(ed25519_dalek::SigningKey::from_bytes(&ik.0))
    }

    pub(crate) fn sign(&mut self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message).to_bytes())
    }

    pub(crate) fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(ed25519_dalek::VerifyingKey::from(&self.0).to_bytes())
    }
}

/// The Ed25519 counterpart of an identity key, used to verify a signature over
/// a published signed pre-key.
#[derive(Clone, Debug)]
pub struct VerifyingKey([u8; CURVE25519_PUBLIC_LENGTH]);

impl VerifyingKey {
    pub(crate) fn from_identity(ik: &PublicKey) -> VerifyingKey {
        VerifyingKey(ik.0)
    }

    pub(crate) fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), X3DHError> {
        let dalek_key = ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(X3DHError::InvalidSignature)?;
        let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        dalek_key
            .verify(message, &dalek_sig)
            .map_err(X3DHError::InvalidSignature)
    }
}

/// An Ed25519 signature over a signed pre-key's public bytes.
#[derive(Clone, Debug)]
pub struct Signature(pub(crate) [u8; SIGNATURE_LENGTH]);

impl Signature {
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(self.0)
    }

    pub fn from_base64(value: &str) -> Result<Signature, X3DHError> {
        let bytes = general_purpose::STANDARD.decode(value)?;
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(X3DHError::InvalidPreKeyBundle);
        }
        Ok(Signature(*array_ref!(bytes, 0, SIGNATURE_LENGTH)))
    }
}

/// HKDF-SHA-256, as used by both the 3DH handshake and the ratchet's root/chain
/// KDFs: `(ikm, salt, info, out_len) -> okm`.
pub(crate) fn hkdf_sha256(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    out_len: usize,
) -> Result<Vec<u8>, X3DHError> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = vec![0u8; out_len];
    hk.expand(info, &mut okm)?;
    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diffie_hellman_round_trips() {
        let a = PrivateKey::new();
        let b = PrivateKey::new();
        let a_pub = PublicKey::from(&a);
        let b_pub = PublicKey::from(&b);
        let shared_a = a.diffie_hellman(&b_pub).unwrap();
        let shared_b = b.diffie_hellman(&a_pub).unwrap();
        assert_eq!(shared_a.0, shared_b.0);
    }

    #[test]
    fn diffie_hellman_rejects_zero_public_key() {
        let a = PrivateKey::new();
        assert!(a.diffie_hellman(&PublicKey::zero()).is_err());
    }

    #[test]
    fn message_key_round_trips_any_plaintext_and_aad() {
        let key = MessageKey::from([7u8; AES256_SECRET_LENGTH]);
        let aad = b"header-bytes";
        let ciphertext = key.encrypt(b"hello ratchet", aad).unwrap();
        let plaintext = key.decrypt(&ciphertext, aad).unwrap();
        assert_eq!(plaintext, b"hello ratchet");
    }

    #[test]
    fn message_key_rejects_tampered_aad() {
        let key = MessageKey::from([7u8; AES256_SECRET_LENGTH]);
        let ciphertext = key.encrypt(b"hello", b"aad-one").unwrap();
        assert!(key.decrypt(&ciphertext, b"aad-two").is_err());
    }

    #[test]
    fn message_key_rejects_short_ciphertext() {
        let key = MessageKey::from([7u8; AES256_SECRET_LENGTH]);
        assert!(key.decrypt(&[0u8; 4], b"aad").is_err());
    }

    #[test]
    fn sign_and_verify_signed_prekey() {
        let ik = PrivateKey::new();
        let spk_pub = PublicKey::from(&PrivateKey::new());
        let mut signing_key = SigningKey::from_identity(&ik);
        let sig = signing_key.sign(spk_pub.as_ref());
        let verifying_key = VerifyingKey::from_identity(&PublicKey::from(&ik));
        assert!(verifying_key.verify(spk_pub.as_ref(), &sig).is_ok());
    }
}
