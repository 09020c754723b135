//! The end-to-end encryption core: a 3DH handshake that bootstraps a shared
//! secret between two parties, and a Double Ratchet that derives a fresh key
//! for every subsequent message while providing forward secrecy and
//! post-compromise security.

pub mod constants;
pub mod errors;
pub mod primitives;
pub mod ratchet;
pub mod session;
pub mod x3dh;
