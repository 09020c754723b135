//! The 3DH handshake: bootstraps a 32-byte shared secret between two parties
//! from a published, signed [`SharedKeyBundle`] and a freshly generated
//! ephemeral key, without requiring either party to have been online before.

use crate::constants::{CURVE25519_PUBLIC_LENGTH, X3DH_INFO};
use crate::errors::X3DHError;
use crate::primitives::{
    hkdf_sha256, PrivateKey, PublicKey, SharedSecret, Signature, SigningKey, VerifyingKey,
};

/// A user's published key material: a long-term identity public key and a
/// signed pre-key, with the signature binding them together.
///
/// Per the redesigned pre-key authentication, an initiator must verify
/// [`SharedKeyBundle::verify`] before running [`X3DHSender::compute`] against
/// it; an unsigned or badly signed bundle is never fed into the handshake.
#[derive(Clone, Debug)]
pub struct SharedKeyBundle {
    pub ik_pub: PublicKey,
    pub spk_pub: PublicKey,
    pub signature: Signature,
    /// A one-time pre-key's public half. The live system never publishes one
    /// (see the one-time pre-key non-goal), but the type admits it.
    pub otk_pub: Option<PublicKey>,
}

impl SharedKeyBundle {
    /// Signs `spk_pub` with the Ed25519 counterpart of `ik_priv`, producing a
    /// publishable bundle.
    pub fn publish(
        ik_priv: &PrivateKey,
        spk_pub: PublicKey,
        otk_pub: Option<PublicKey>,
    ) -> SharedKeyBundle {
        let ik_pub = PublicKey::from(ik_priv);
        let mut signing_key = SigningKey::from_identity(ik_priv);
        let signature = signing_key.sign(spk_pub.as_ref());
        SharedKeyBundle {
            ik_pub,
            spk_pub,
            signature,
            otk_pub,
        }
    }

    /// Verifies `signature` was produced by `ik_pub`'s Ed25519 counterpart
    /// over `spk_pub`.
    pub fn verify(&self) -> Result<(), X3DHError> {
        let verifying_key = VerifyingKey::from_identity(&self.ik_pub);
        verifying_key.verify(self.spk_pub.as_ref(), &self.signature)
    }
}

/// The initiator side of the handshake: computes `SK` from its own identity
/// and a freshly generated ephemeral keypair against a peer's published bundle.
pub struct X3DHSender;

impl X3DHSender {
    /// Computes the initiator's `SK`, verifying `peer_bundle` first.
    ///
    /// `ek_priv` is a fresh, one-shot ephemeral private key; its public half
    /// is the `EKPub` attached to the first outbound message.
    pub fn compute(
        ik_priv: &PrivateKey,
        ek_priv: &PrivateKey,
        peer_bundle: &SharedKeyBundle,
    ) -> Result<SharedSecret, X3DHError> {
        peer_bundle.verify()?;

        let dh1 = ik_priv.diffie_hellman(&peer_bundle.spk_pub)?;
        let dh2 = ek_priv.diffie_hellman(&peer_bundle.ik_pub)?;
        let dh3 = ek_priv.diffie_hellman(&peer_bundle.spk_pub)?;

        let mut salt = Vec::with_capacity(4 * CURVE25519_PUBLIC_LENGTH);
        salt.extend_from_slice(dh1.as_ref());
        salt.extend_from_slice(dh2.as_ref());
        salt.extend_from_slice(dh3.as_ref());
        if let Some(otk_pub) = &peer_bundle.otk_pub {
            let dh4 = ek_priv.diffie_hellman(otk_pub)?;
            salt.extend_from_slice(dh4.as_ref());
        }

        derive_sk(&salt)
    }
}

/// The responder side of the handshake: computes the mirror of `SK` from its
/// own published bundle's private halves and the initiator's identity and
/// ephemeral public keys, as carried in the attached handshake.
pub struct X3DHReceiver;

impl X3DHReceiver {
    /// Computes the responder's `SK`. `otk_priv` must be `Some` exactly when
    /// the bundle the initiator used had an `otk_pub` (never, in this system).
    pub fn compute(
        ik_priv: &PrivateKey,
        spk_priv: &PrivateKey,
        otk_priv: Option<&PrivateKey>,
        peer_ik_pub: &PublicKey,
        peer_ek_pub: &PublicKey,
    ) -> Result<SharedSecret, X3DHError> {
        let dh1 = spk_priv.diffie_hellman(peer_ik_pub)?;
        let dh2 = ik_priv.diffie_hellman(peer_ek_pub)?;
        let dh3 = spk_priv.diffie_hellman(peer_ek_pub)?;

        let mut salt = Vec::with_capacity(4 * CURVE25519_PUBLIC_LENGTH);
        salt.extend_from_slice(dh1.as_ref());
        salt.extend_from_slice(dh2.as_ref());
        salt.extend_from_slice(dh3.as_ref());
        if let Some(otk_priv) = otk_priv {
            let dh4 = otk_priv.diffie_hellman(peer_ek_pub)?;
            salt.extend_from_slice(dh4.as_ref());
        }

        derive_sk(&salt)
    }
}

/// `HKDF(ikm = empty, salt = concatenated DHs, info = "SharedKey", 32)`.
fn derive_sk(concatenated_dhs: &[u8]) -> Result<SharedSecret, X3DHError> {
    let okm = hkdf_sha256(&[], concatenated_dhs, X3DH_INFO, CURVE25519_PUBLIC_LENGTH)?;
    let mut sk = [0u8; CURVE25519_PUBLIC_LENGTH];
    sk.copy_from_slice(&okm);
    Ok(SharedSecret::from(sk))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_and_receiver_agree_without_one_time_prekey() {
        let ik_a = PrivateKey::new();
        let ek_a = PrivateKey::new();

        let ik_b = PrivateKey::new();
        let spk_b = PrivateKey::new();
        let bundle = SharedKeyBundle::publish(&ik_b, PublicKey::from(&spk_b), None);

        let sk_a = X3DHSender::compute(&ik_a, &ek_a, &bundle).unwrap();
        let sk_b = X3DHReceiver::compute(
            &ik_b,
            &spk_b,
            None,
            &PublicKey::from(&ik_a),
            &PublicKey::from(&ek_a),
        )
        .unwrap();

        assert_eq!(sk_a.as_ref(), sk_b.as_ref());
    }

    #[test]
    fn sender_and_receiver_agree_with_one_time_prekey() {
        let ik_a = PrivateKey::new();
        let ek_a = PrivateKey::new();

        let ik_b = PrivateKey::new();
        let spk_b = PrivateKey::new();
        let otk_b = PrivateKey::new();
        let bundle =
            SharedKeyBundle::publish(&ik_b, PublicKey::from(&spk_b), Some(PublicKey::from(&otk_b)));

        let sk_a = X3DHSender::compute(&ik_a, &ek_a, &bundle).unwrap();
        let sk_b = X3DHReceiver::compute(
            &ik_b,
            &spk_b,
            Some(&otk_b),
            &PublicKey::from(&ik_a),
            &PublicKey::from(&ek_a),
        )
        .unwrap();

        assert_eq!(sk_a.as_ref(), sk_b.as_ref());
    }

    #[test]
    fn sender_rejects_tampered_bundle_signature() {
        let ik_a = PrivateKey::new();
        let ek_a = PrivateKey::new();

        let ik_b = PrivateKey::new();
        let spk_b = PrivateKey::new();
        let mut bundle = SharedKeyBundle::publish(&ik_b, PublicKey::from(&spk_b), None);
        bundle.spk_pub = PublicKey::from(&PrivateKey::new());

        assert!(X3DHSender::compute(&ik_a, &ek_a, &bundle).is_err());
    }
}
