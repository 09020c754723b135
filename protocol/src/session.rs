//! Session lifecycle: decides when to run the 3DH handshake for a peer pair
//! and owns the resulting [`RatchetState`] across the `None -> *-> Active`
//! states a session moves through, per the initiator/responder asymmetry.

use crate::errors::RatchetError;
use crate::primitives::{PrivateKey, PublicKey};
use crate::ratchet::{Header, RatchetState};
use crate::x3dh::{SharedKeyBundle, X3DHReceiver, X3DHSender};
use serde::{Deserialize, Serialize};

/// Where a session currently sits in its lifecycle. `None` has no backing
/// [`RatchetState`] at all; every other state does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    None,
    InitiatorPreFirstSend,
    ResponderReady,
    Active,
}

/// A session for one ordered peer pair: which lifecycle state it is in, plus
/// the ratchet state once the handshake has produced one.
#[derive(Clone, Serialize, Deserialize)]
pub struct Session {
    state: SessionState,
    ratchet: Option<RatchetState>,
}

impl Session {
    /// A session with no prior history: the `None` state.
    pub fn new() -> Self {
        Session {
            state: SessionState::None,
            ratchet: None,
        }
    }

    /// Reconstructs a session from a cached [`RatchetState`] and the
    /// lifecycle state it was last persisted under.
    pub fn from_cached(state: SessionState, ratchet: RatchetState) -> Self {
        Session {
            state,
            ratchet: Some(ratchet),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn ratchet_state(&self) -> Option<&RatchetState> {
        self.ratchet.as_ref()
    }

    /// Runs 3DH as the initiator against the peer's published, signed
    /// bundle and creates the initial ratchet state. Moves `None` to
    /// `InitiatorPreFirstSend`. The caller is responsible for attaching
    /// `EKPub` (the public half of `ek_priv`) to the first outbound envelope.
    pub fn begin_as_initiator(
        &mut self,
        ik_priv: &PrivateKey,
        ek_priv: &PrivateKey,
        peer_bundle: &SharedKeyBundle,
    ) -> Result<(), RatchetError> {
        let sk = X3DHSender::compute(ik_priv, ek_priv, peer_bundle)?;
        self.ratchet = Some(RatchetState::init_as_initiator(
            sk,
            peer_bundle.spk_pub.clone(),
        ));
        self.state = SessionState::InitiatorPreFirstSend;
        Ok(())
    }

    /// Runs the mirror of 3DH as the responder from an inbound message's
    /// attached handshake, and creates the initial ratchet state. Moves
    /// `None` to `ResponderReady`.
    pub fn begin_as_responder(
        &mut self,
        ik_priv: &PrivateKey,
        spk_priv: &PrivateKey,
        spk_pub: PublicKey,
        peer_ik_pub: &PublicKey,
        peer_ek_pub: &PublicKey,
    ) -> Result<(), RatchetError> {
        let sk = X3DHReceiver::compute(ik_priv, spk_priv, None, peer_ik_pub, peer_ek_pub)?;
        self.ratchet = Some(RatchetState::init_as_responder(
            sk,
            spk_priv.clone(),
            spk_pub,
        ));
        self.state = SessionState::ResponderReady;
        Ok(())
    }

    /// Encrypts `plaintext` through the ratchet. Requires the session to
    /// have already run 3DH via [`Session::begin_as_initiator`] or
    /// [`Session::begin_as_responder`] (or to have been reloaded from the
    /// cache). Always leaves the session in `Active`.
    pub fn send(&mut self, plaintext: &[u8]) -> Result<(Header, Vec<u8>), RatchetError> {
        let ratchet = self
            .ratchet
            .as_mut()
            .ok_or(RatchetError::MissingPrerequisite)?;
        let result = ratchet.send(plaintext)?;
        self.state = SessionState::Active;
        Ok(result)
    }

    /// Decrypts a message through the ratchet. Requires the session to
    /// already have a ratchet state, which the caller must have established
    /// via [`Session::begin_as_responder`] (or a prior `Active` round trip)
    /// before calling this. Always leaves the session in `Active`.
    pub fn receive(&mut self, header: &Header, ciphertext: &[u8]) -> Result<Vec<u8>, RatchetError> {
        let ratchet = self
            .ratchet
            .as_mut()
            .ok_or(RatchetError::MissingPrerequisite)?;
        let plaintext = ratchet.receive(header, ciphertext)?;
        self.state = SessionState::Active;
        Ok(plaintext)
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::PublicKey;

    #[test]
    fn initiator_and_responder_reach_active_and_exchange_messages() {
        let ik_a = PrivateKey::new();
        let ek_a = PrivateKey::new();

        let ik_b = PrivateKey::new();
        let spk_b = PrivateKey::new();
        let spk_b_pub = PublicKey::from(&spk_b);
        let bundle = SharedKeyBundle::publish(&ik_b, spk_b_pub.clone(), None);

        let mut alice = Session::new();
        assert_eq!(alice.state(), SessionState::None);
        alice.begin_as_initiator(&ik_a, &ek_a, &bundle).unwrap();
        assert_eq!(alice.state(), SessionState::InitiatorPreFirstSend);

        let (header, ciphertext) = alice.send(b"hi bob").unwrap();
        assert_eq!(alice.state(), SessionState::Active);

        let mut bob = Session::new();
        bob.begin_as_responder(
            &ik_b,
            &spk_b,
            spk_b_pub,
            &PublicKey::from(&ik_a),
            &PublicKey::from(&ek_a),
        )
        .unwrap();
        assert_eq!(bob.state(), SessionState::ResponderReady);

        let plaintext = bob.receive(&header, &ciphertext).unwrap();
        assert_eq!(bob.state(), SessionState::Active);
        assert_eq!(plaintext, b"hi bob");
    }

    #[test]
    fn send_without_handshake_fails() {
        let mut session = Session::new();
        assert!(matches!(
            session.send(b"too soon"),
            Err(RatchetError::MissingPrerequisite)
        ));
    }
}
