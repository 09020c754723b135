//! Ambient, out-of-core-scope machinery shared between the relay and the
//! client: the wire envelope format, the user and session stores, and
//! process configuration.

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod store;

pub use cache::{InMemorySessionCache, SessionCache};
pub use config::{Config, CONFIG};
pub use envelope::{Envelope, Header, SharedKey, X3dhHandshake};
pub use error::CommonError;
pub use store::{InMemoryUserStore, User, UserStore};
