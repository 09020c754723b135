//! The JSON wire framing exchanged between peers over the relay, per the
//! peer-to-relay message envelope: `from`/`to`, the ratchet header, the
//! base64 ciphertext, and an optional one-shot 3DH handshake attachment.

use crate::error::CommonError;
use base64::{engine::general_purpose, Engine as _};
use protocol::primitives::{PublicKey, Signature};
use protocol::ratchet::Header as RatchetHeader;
use protocol::x3dh::SharedKeyBundle;
use serde::{Deserialize, Serialize};

/// Wire form of [`RatchetHeader`]: the same three fields, base64/plain JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "pub")]
    pub dh_pub: String,
    pub msg_num: u32,
    pub prev: u32,
}

impl From<&RatchetHeader> for Header {
    fn from(header: &RatchetHeader) -> Header {
        Header {
            dh_pub: header.dh_pub.to_base64(),
            msg_num: header.msg_num,
            prev: header.prev_chain_len,
        }
    }
}

impl TryFrom<&Header> for RatchetHeader {
    type Error = CommonError;

    fn try_from(header: &Header) -> Result<RatchetHeader, CommonError> {
        Ok(RatchetHeader {
            dh_pub: PublicKey::from_base64(&header.dh_pub)?,
            msg_num: header.msg_num,
            prev_chain_len: header.prev,
        })
    }
}

/// The one-shot handshake attachment carried on an initiator's first
/// outbound message to a peer it has no cached session with yet: the
/// initiator's identity key (the responder has no other way to learn it)
/// and its ephemeral key for this handshake.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct X3dhHandshake {
    pub ik_pub: String,
    pub ek_pub: String,
}

impl X3dhHandshake {
    pub fn new(ik_pub: &PublicKey, ek_pub: &PublicKey) -> X3dhHandshake {
        X3dhHandshake {
            ik_pub: ik_pub.to_base64(),
            ek_pub: ek_pub.to_base64(),
        }
    }

    pub fn ik_pub(&self) -> Result<PublicKey, CommonError> {
        Ok(PublicKey::from_base64(&self.ik_pub)?)
    }

    pub fn ek_pub(&self) -> Result<PublicKey, CommonError> {
        Ok(PublicKey::from_base64(&self.ek_pub)?)
    }
}

/// Wire form of [`SharedKeyBundle`], the shape `GET /keys/{name}` returns.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SharedKey {
    pub ik_pub: String,
    pub spk_pub: String,
    pub signature: String,
}

impl From<&SharedKeyBundle> for SharedKey {
    fn from(bundle: &SharedKeyBundle) -> SharedKey {
        SharedKey {
            ik_pub: bundle.ik_pub.to_base64(),
            spk_pub: bundle.spk_pub.to_base64(),
            signature: bundle.signature.to_base64(),
        }
    }
}

impl TryFrom<&SharedKey> for SharedKeyBundle {
    type Error = CommonError;

    fn try_from(value: &SharedKey) -> Result<SharedKeyBundle, CommonError> {
        Ok(SharedKeyBundle {
            ik_pub: PublicKey::from_base64(&value.ik_pub)?,
            spk_pub: PublicKey::from_base64(&value.spk_pub)?,
            signature: Signature::from_base64(&value.signature)?,
            otk_pub: None,
        })
    }
}

/// The envelope that travels over the relay's bidirectional text channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub from: String,
    pub to: String,
    pub header: Header,
    pub ciphertext: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x3dh_handshake: Option<X3dhHandshake>,
}

impl Envelope {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        header: &RatchetHeader,
        ciphertext: &[u8],
        handshake: Option<(&PublicKey, &PublicKey)>,
    ) -> Envelope {
        Envelope {
            from: from.into(),
            to: to.into(),
            header: Header::from(header),
            ciphertext: general_purpose::STANDARD.encode(ciphertext),
            x3dh_handshake: handshake.map(|(ik_pub, ek_pub)| X3dhHandshake::new(ik_pub, ek_pub)),
        }
    }

    pub fn ciphertext_bytes(&self) -> Result<Vec<u8>, CommonError> {
        Ok(general_purpose::STANDARD.decode(&self.ciphertext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::primitives::PrivateKey;

    #[test]
    fn envelope_round_trips_through_json() {
        let dh_priv = PrivateKey::new();
        let dh_pub = PublicKey::from(&dh_priv);
        let header = RatchetHeader {
            dh_pub,
            msg_num: 3,
            prev_chain_len: 1,
        };
        let ik_pub = PublicKey::from(&PrivateKey::new());
        let ek_pub = PublicKey::from(&PrivateKey::new());
        let envelope = Envelope::new("alice", "bob", &header, b"hello", Some((&ik_pub, &ek_pub)));

        let json = serde_json::to_string(&envelope).unwrap();
        let reloaded: Envelope = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded.from, "alice");
        assert_eq!(reloaded.to, "bob");
        assert_eq!(reloaded.ciphertext_bytes().unwrap(), b"hello");
        assert!(reloaded.x3dh_handshake.is_some());
        let recovered_header = RatchetHeader::try_from(&reloaded.header).unwrap();
        assert_eq!(recovered_header.msg_num, 3);
        assert_eq!(recovered_header.prev_chain_len, 1);
    }

    #[test]
    fn envelope_without_handshake_omits_the_field() {
        let dh_pub = PublicKey::from(&PrivateKey::new());
        let header = RatchetHeader {
            dh_pub,
            msg_num: 0,
            prev_chain_len: 0,
        };
        let envelope = Envelope::new("alice", "bob", &header, b"hi", None);
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(!json.contains("x3dh_handshake"));
    }
}
