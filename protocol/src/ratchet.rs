//! This module implements the Double Ratchet algorithm, a core component for secure, asynchronous messaging.
//! The Double Ratchet ensures forward secrecy and post-compromise security by combining symmetric-key and Diffie-Hellman ratcheting.
//! It manages the cryptographic state for sending and receiving messages, handling key derivation, message encryption,
//! and decryption, including mechanisms for skipping and reordering messages.
//! For more information, see the [Signal Protocol specification](https://signal.org/docs/specifications/doubleratchet/).

use crate::constants::{
    AES256_NONCE_LENGTH, AES256_SECRET_LENGTH, CHAIN_KDF_IKM, CHAIN_KDF_INFO,
    CURVE25519_PUBLIC_LENGTH, HEADER_AAD_LENGTH, MAX_SKIP, ROOT_KDF_INFO,
};
use crate::errors::RatchetError;
use crate::primitives::{hkdf_sha256, MessageKey, PrivateKey, PublicKey, SharedSecret};
use arrayref::array_ref;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A local Diffie-Hellman ratchet keypair: the current `(DHsPriv, DHsPub)`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RatchetKeyPair {
    public_key: PublicKey,
    private_key: PrivateKey,
}

impl RatchetKeyPair {
    /// Generates a fresh keypair, as performed at the start of every local DH ratchet step.
    pub fn new() -> Self {
        let private_key = PrivateKey::new();
        let public_key = PublicKey::from(&private_key);
        Self {
            public_key,
            private_key,
        }
    }

    fn from_parts(private_key: PrivateKey, public_key: PublicKey) -> Self {
        Self {
            public_key,
            private_key,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

/// The header that travels alongside every ciphertext and is bound as AEAD
/// associated data: the sender's current ratchet public key plus the two
/// counters the receiver needs to detect a DH ratchet and skipped messages.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Header {
    /// Sender's current ratchet public key.
    pub dh_pub: PublicKey,
    /// Index of this message within the current sending chain.
    pub msg_num: u32,
    /// Length of the sender's previous sending chain when this one started.
    pub prev_chain_len: u32,
}

impl Header {
    /// Serializes the header to the fixed 40-byte `Pub(32) ‖ MsgNum(u32 BE) ‖ Prev(u32 BE)`
    /// layout used as AEAD associated data. Part of the wire contract.
    pub fn to_aad(&self) -> [u8; HEADER_AAD_LENGTH] {
        let mut buf = [0u8; HEADER_AAD_LENGTH];
        buf[..CURVE25519_PUBLIC_LENGTH].copy_from_slice(self.dh_pub.as_ref());
        buf[CURVE25519_PUBLIC_LENGTH..CURVE25519_PUBLIC_LENGTH + 4]
            .copy_from_slice(&self.msg_num.to_be_bytes());
        buf[CURVE25519_PUBLIC_LENGTH + 4..].copy_from_slice(&self.prev_chain_len.to_be_bytes());
        buf
    }
}

impl TryFrom<&[u8; HEADER_AAD_LENGTH]> for Header {
    type Error = RatchetError;

    fn try_from(value: &[u8; HEADER_AAD_LENGTH]) -> Result<Self, Self::Error> {
        let dh_pub = PublicKey::from(array_ref!(value, 0, CURVE25519_PUBLIC_LENGTH));
        let msg_num = u32::from_be_bytes(*array_ref!(value, CURVE25519_PUBLIC_LENGTH, 4));
        let prev_chain_len =
            u32::from_be_bytes(*array_ref!(value, CURVE25519_PUBLIC_LENGTH + 4, 4));
        Ok(Header {
            dh_pub,
            msg_num,
            prev_chain_len,
        })
    }
}

#[derive(Clone, Serialize, Deserialize)]
struct SkippedEntry {
    dh_pub: PublicKey,
    msg_num: u32,
    message_key: MessageKey,
}

mod skipped_map {
    use super::{HashMap, MessageKey, PublicKey, SkippedEntry};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(
        map: &HashMap<(PublicKey, u32), MessageKey>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries: Vec<SkippedEntry> = map
            .iter()
            .map(|((dh_pub, msg_num), message_key)| SkippedEntry {
                dh_pub: dh_pub.clone(),
                msg_num: *msg_num,
                message_key: message_key.clone(),
            })
            .collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<HashMap<(PublicKey, u32), MessageKey>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<SkippedEntry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| ((e.dh_pub, e.msg_num), e.message_key))
            .collect())
    }
}

/// The full per-peer, per-role state of a Double Ratchet session.
///
/// A `RatchetState` is created once (see [`RatchetState::init_as_initiator`]/
/// [`RatchetState::init_as_responder`]) from the 3DH shared secret and then
/// evolves exclusively through [`RatchetState::send`] and
/// [`RatchetState::receive`]; callers serialize it wholesale into the session
/// cache between calls.
#[derive(Clone, Serialize, Deserialize)]
pub struct RatchetState {
    root_key: SharedSecret,
    dhs: RatchetKeyPair,
    dhr: Option<PublicKey>,
    sending_chain_key: Option<SharedSecret>,
    receiving_chain_key: Option<SharedSecret>,
    ns: u32,
    nr: u32,
    pn: u32,
    #[serde(with = "skipped_map")]
    skipped: HashMap<(PublicKey, u32), MessageKey>,
}

impl RatchetState {
    /// Builds the initiator's initial state: `DHr` is the peer's signed
    /// pre-key, the local ratchet keypair has not been rotated yet, and
    /// `SendingChainKey` is left unset so the first `Send` performs the
    /// lazy local DH ratchet.
    pub fn init_as_initiator(root_key: SharedSecret, peer_spk_pub: PublicKey) -> Self {
        RatchetState {
            root_key,
            dhs: RatchetKeyPair::from_parts(PrivateKey::new(), PublicKey::zero()),
            dhr: Some(peer_spk_pub),
            sending_chain_key: None,
            receiving_chain_key: None,
            ns: 0,
            nr: 0,
            pn: 0,
            skipped: HashMap::new(),
        }
    }

    /// Builds the responder's initial state: the local ratchet keypair is the
    /// signed pre-key the initiator just used, `DHr` is unset until the first
    /// inbound message's header reveals the initiator's ratchet key.
    pub fn init_as_responder(
        root_key: SharedSecret,
        spk_priv: PrivateKey,
        spk_pub: PublicKey,
    ) -> Self {
        RatchetState {
            root_key,
            dhs: RatchetKeyPair::from_parts(spk_priv, spk_pub),
            dhr: None,
            sending_chain_key: None,
            receiving_chain_key: None,
            ns: 0,
            nr: 0,
            pn: 0,
            skipped: HashMap::new(),
        }
    }

    /// Encrypts `plaintext`, performing a local DH ratchet step first if no
    /// sending chain is currently open.
    pub fn send(&mut self, plaintext: &[u8]) -> Result<(Header, Vec<u8>), RatchetError> {
        if self.sending_chain_key.is_none() {
            let dhr = self.dhr.clone().ok_or(RatchetError::MissingPrerequisite)?;
            let new_keypair = RatchetKeyPair::new();
            let shared = new_keypair.private_key.diffie_hellman(&dhr)?;
            let (new_root_key, new_chain_key) = root_kdf(&self.root_key, &shared)?;
            self.root_key = new_root_key;
            self.sending_chain_key = Some(new_chain_key);
            self.dhs = new_keypair;
            self.ns = 0;
        }

        let msg_num = self.ns;
        let chain_key = self
            .sending_chain_key
            .as_ref()
            .ok_or(RatchetError::MissingPrerequisite)?;
        let (next_chain_key, message_key) = chain_kdf(chain_key)?;
        self.sending_chain_key = Some(next_chain_key);
        self.ns += 1;

        let header = Header {
            dh_pub: self.dhs.public_key().clone(),
            msg_num,
            prev_chain_len: self.pn,
        };
        let aad = header.to_aad();
        let ciphertext = message_key.encrypt(plaintext, &aad)?;
        Ok((header, ciphertext))
    }

    /// Decrypts a message, draining the skipped-key cache, performing a DH
    /// ratchet step if `header.dh_pub` is new, and generating any skipped
    /// keys the gap between counters implies.
    ///
    /// Rejects a ciphertext shorter than the AEAD nonce before touching any
    /// state: a malformed envelope must never be allowed to commit a DH
    /// ratchet step or advance counters.
    pub fn receive(&mut self, header: &Header, ciphertext: &[u8]) -> Result<Vec<u8>, RatchetError> {
        if ciphertext.len() < AES256_NONCE_LENGTH {
            return Err(RatchetError::DecodeFailure(
                "ciphertext shorter than AEAD nonce".to_string(),
            ));
        }

        if let Some(message_key) = self
            .skipped
            .remove(&(header.dh_pub.clone(), header.msg_num))
        {
            let aad = header.to_aad();
            return Ok(message_key.decrypt(ciphertext, &aad)?);
        }

        let is_new_ratchet_key = self.dhr.as_ref() != Some(&header.dh_pub);
        if is_new_ratchet_key {
            if self.receiving_chain_key.is_some() && header.prev_chain_len > self.nr {
                self.skip_message_keys(header.prev_chain_len)?;
            }

            self.pn = self.ns;
            self.ns = 0;
            self.nr = 0;

            let shared = self.dhs.private_key.diffie_hellman(&header.dh_pub)?;
            let (new_root_key, new_chain_key) = root_kdf(&self.root_key, &shared)?;
            self.root_key = new_root_key;
            self.receiving_chain_key = Some(new_chain_key);
            self.dhr = Some(header.dh_pub.clone());

            // Per the redesigned behavior: the peer has now seen this ratchet
            // public key, so the next local Send must open a fresh sending
            // chain under a new DHs rather than reuse the one it superseded.
            self.sending_chain_key = None;
        }

        if header.msg_num > self.nr {
            self.skip_message_keys(header.msg_num)?;
        }

        let chain_key = self
            .receiving_chain_key
            .as_ref()
            .ok_or(RatchetError::MissingPrerequisite)?;
        let (next_chain_key, message_key) = chain_kdf(chain_key)?;
        self.receiving_chain_key = Some(next_chain_key);
        self.nr += 1;

        let aad = header.to_aad();
        Ok(message_key.decrypt(ciphertext, &aad)?)
    }

    /// Mints and caches message keys for `[Nr, until)` under the current
    /// `DHr`, bounded by `MAX_SKIP` both per-call and for the total cache size.
    fn skip_message_keys(&mut self, until: u32) -> Result<(), RatchetError> {
        if until <= self.nr {
            return Ok(());
        }
        if (until - self.nr) as u64 > MAX_SKIP as u64 {
            return Err(RatchetError::SkipLimitExceeded);
        }
        if self.skipped.len() as u64 + (until - self.nr) as u64 > MAX_SKIP as u64 {
            return Err(RatchetError::SkipLimitExceeded);
        }

        let dhr = self.dhr.clone().ok_or(RatchetError::MissingPrerequisite)?;
        while self.nr < until {
            let chain_key = self
                .receiving_chain_key
                .as_ref()
                .ok_or(RatchetError::MissingPrerequisite)?;
            let (next_chain_key, message_key) = chain_kdf(chain_key)?;
            self.receiving_chain_key = Some(next_chain_key);
            self.skipped.insert((dhr.clone(), self.nr), message_key);
            self.nr += 1;
        }
        Ok(())
    }
}

/// `RootKDF(RootKey, DH output) -> (newRootKey, newChainKey)`.
fn root_kdf(root_key: &SharedSecret, dh_output: &SharedSecret) -> Result<(SharedSecret, SharedSecret), RatchetError> {
    let okm = hkdf_sha256(dh_output.as_ref(), root_key.as_ref(), ROOT_KDF_INFO, 64)?;
    let mut new_root_key = [0u8; AES256_SECRET_LENGTH];
    let mut new_chain_key = [0u8; AES256_SECRET_LENGTH];
    new_root_key.copy_from_slice(&okm[..32]);
    new_chain_key.copy_from_slice(&okm[32..]);
    Ok((SharedSecret::from(new_root_key), SharedSecret::from(new_chain_key)))
}

/// `ChainKDF(chainKey) -> (nextChainKey, messageKey)`.
fn chain_kdf(chain_key: &SharedSecret) -> Result<(SharedSecret, MessageKey), RatchetError> {
    let okm = hkdf_sha256(CHAIN_KDF_IKM, chain_key.as_ref(), CHAIN_KDF_INFO, 64)?;
    let mut next_chain_key = [0u8; AES256_SECRET_LENGTH];
    let mut message_key = [0u8; AES256_SECRET_LENGTH];
    next_chain_key.copy_from_slice(&okm[..32]);
    message_key.copy_from_slice(&okm[32..]);
    Ok((SharedSecret::from(next_chain_key), MessageKey::from(message_key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paired_states() -> (RatchetState, RatchetState) {
        let spk_priv = PrivateKey::new();
        let spk_pub = PublicKey::from(&spk_priv);
        let sk = SharedSecret::from([42u8; AES256_SECRET_LENGTH]);
        let initiator = RatchetState::init_as_initiator(sk.clone(), spk_pub.clone());
        let responder = RatchetState::init_as_responder(sk, spk_priv, spk_pub);
        (initiator, responder)
    }

    #[test]
    fn fresh_session_round_trip() {
        let (mut alice, mut bob) = paired_states();
        let (header, ciphertext) = alice.send(b"hello bob").unwrap();
        let plaintext = bob.receive(&header, &ciphertext).unwrap();
        assert_eq!(plaintext, b"hello bob");
    }

    #[test]
    fn ping_pong_dh_ratchet() {
        let (mut alice, mut bob) = paired_states();

        let (h1, c1) = alice.send(b"ping 1").unwrap();
        assert_eq!(bob.receive(&h1, &c1).unwrap(), b"ping 1");

        let (h2, c2) = bob.send(b"pong 1").unwrap();
        assert_eq!(alice.receive(&h2, &c2).unwrap(), b"pong 1");

        let (h3, c3) = alice.send(b"ping 2").unwrap();
        assert_eq!(bob.receive(&h3, &c3).unwrap(), b"ping 2");

        let (h4, c4) = bob.send(b"pong 2").unwrap();
        assert_eq!(alice.receive(&h4, &c4).unwrap(), b"pong 2");
    }

    #[test]
    fn out_of_order_within_a_chain() {
        let (mut alice, mut bob) = paired_states();

        let (h1, c1) = alice.send(b"one").unwrap();
        let (h2, c2) = alice.send(b"two").unwrap();
        let (h3, c3) = alice.send(b"three").unwrap();

        assert_eq!(bob.receive(&h3, &c3).unwrap(), b"three");
        assert_eq!(bob.receive(&h1, &c1).unwrap(), b"one");
        assert_eq!(bob.receive(&h2, &c2).unwrap(), b"two");
    }

    #[test]
    fn chain_transition_with_loss() {
        let (mut alice, mut bob) = paired_states();

        let (h1, c1) = alice.send(b"a1").unwrap();
        let (_h2_lost, _c2_lost) = alice.send(b"a2").unwrap();
        let (h3, c3) = alice.send(b"a3").unwrap();
        assert_eq!(bob.receive(&h1, &c1).unwrap(), b"a1");

        let (h4, c4) = bob.send(b"b1").unwrap();
        assert_eq!(alice.receive(&h4, &c4).unwrap(), b"b1");

        // a2 never arrives; a3 and the next alice message still must decrypt.
        assert_eq!(bob.receive(&h3, &c3).unwrap(), b"a3");

        let (h5, c5) = alice.send(b"a4").unwrap();
        assert_eq!(bob.receive(&h5, &c5).unwrap(), b"a4");
    }

    #[test]
    fn skip_limit_is_enforced() {
        let (mut alice, mut bob) = paired_states();
        let (h1, c1) = alice.send(b"first").unwrap();
        bob.receive(&h1, &c1).unwrap();

        for _ in 0..MAX_SKIP + 1 {
            alice.send(b"filler").unwrap();
        }
        let (h_far, c_far) = alice.send(b"too far").unwrap();
        assert!(matches!(
            bob.receive(&h_far, &c_far),
            Err(RatchetError::SkipLimitExceeded)
        ));
    }

    #[test]
    fn state_serializes_and_reloads_with_pending_skips() {
        let (mut alice, mut bob) = paired_states();

        let (h1, c1) = alice.send(b"one").unwrap();
        let (h2, c2) = alice.send(b"two").unwrap();
        bob.receive(&h2, &c2).unwrap();

        let json = serde_json::to_string(&bob).unwrap();
        let mut reloaded: RatchetState = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded.receive(&h1, &c1).unwrap(), b"one");
    }

    #[test]
    fn receive_rejects_short_ciphertext_without_committing_state() {
        let (mut alice, mut bob) = paired_states();
        let (header, ciphertext) = alice.send(b"hello bob").unwrap();

        let short = &ciphertext[..4];
        assert!(short.len() < AES256_NONCE_LENGTH);
        assert!(matches!(
            bob.receive(&header, short),
            Err(RatchetError::DecodeFailure(_))
        ));

        // The rejected attempt must not have committed the DH ratchet step,
        // the receiving chain, or the counters: the original message still
        // decrypts correctly afterward.
        assert_eq!(bob.receive(&header, &ciphertext).unwrap(), b"hello bob");
    }
}
