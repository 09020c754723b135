
// byte size of a Curve25519 private key
pub(crate) const CURVE25519_SECRET_LENGTH: usize = 32;
// byte size of a Curve25519 public key
pub(crate) const CURVE25519_PUBLIC_LENGTH: usize = CURVE25519_SECRET_LENGTH;

pub(crate) const SIGNATURE_LENGTH: usize = 64;
// byte size of a sha256 hash
pub(crate) const SHA256_HASH_LENGTH: usize = 32;
// byte size of an aes256 key
pub(crate) const AES256_SECRET_LENGTH: usize = 32;
// byte size of aes256 nonce
pub(crate) const AES256_NONCE_LENGTH: usize = 12;

/// Maximum number of message keys the ratchet will mint ahead of the
/// receiving chain in a single operation, and the cap on `Skipped` overall.
pub const MAX_SKIP: u32 = 1000;

/// HKDF `info` label for the 3DH shared-key derivation. Part of the wire contract.
pub(crate) const X3DH_INFO: &[u8] = b"SharedKey";
/// HKDF `info` label for the root-key ratchet step. Part of the wire contract.
pub(crate) const ROOT_KDF_INFO: &[u8] = b"RootKDF";
/// HKDF `info` label for the chain-key ratchet step. Part of the wire contract.
pub(crate) const CHAIN_KDF_INFO: &[u8] = b"ChainKDF";
/// Fixed HKDF input key material for chain-key advancement. Part of the wire contract.
pub(crate) const CHAIN_KDF_IKM: &[u8] = b"ChainInput";

/// Length in bytes of the serialized [`crate::ratchet::Header`] used as AEAD associated data.
pub(crate) const HEADER_AAD_LENGTH: usize =
    CURVE25519_PUBLIC_LENGTH + size_of::<u32>() + size_of::<u32>();
