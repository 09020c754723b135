//! A client's local identity keystore: its own long-term identity and
//! signed pre-key private halves, keyed by username. This is never shared
//! with the relay, which only ever sees the public bundle derived from it.
//! Out of scope for the ratchet's correctness, but implemented here so the
//! client can run end-to-end against an in-process stand-in for the
//! production document store.

use crate::error::CommonError;
use protocol::primitives::{PrivateKey, PublicKey};
use protocol::x3dh::SharedKeyBundle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The private halves a registered account owns.
#[derive(Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub ik_priv: PrivateKey,
    pub spk_priv: PrivateKey,
}

impl User {
    /// Registers a fresh identity and signed pre-key for `name`.
    pub fn generate(name: impl Into<String>) -> User {
        User {
            name: name.into(),
            ik_priv: PrivateKey::new(),
            spk_priv: PrivateKey::new(),
        }
    }

    /// The signed bundle this user publishes for others to run 3DH against.
    pub fn shared_key_bundle(&self) -> SharedKeyBundle {
        SharedKeyBundle::publish(&self.ik_priv, PublicKey::from(&self.spk_priv), None)
    }
}

pub trait UserStore {
    async fn create(&self, user: User) -> Result<(), CommonError>;
    async fn get_by_name(&self, name: &str) -> Result<User, CommonError>;
}

/// An in-memory stand-in for the production (Mongo-backed, in the original
/// system) user store.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        InMemoryUserStore {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl UserStore for InMemoryUserStore {
    async fn create(&self, user: User) -> Result<(), CommonError> {
        let mut guard = self.users.write().await;
        if guard.contains_key(&user.name) {
            return Err(CommonError::UserAlreadyExists(user.name));
        }
        guard.insert(user.name.clone(), user);
        Ok(())
    }

    async fn get_by_name(&self, name: &str) -> Result<User, CommonError> {
        self.users
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| CommonError::UnknownUser(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_lookup_round_trips() {
        let store = InMemoryUserStore::new();
        store.create(User::generate("alice")).await.unwrap();
        let alice = store.get_by_name("alice").await.unwrap();
        assert_eq!(alice.name, "alice");
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let store = InMemoryUserStore::new();
        store.create(User::generate("alice")).await.unwrap();
        assert!(matches!(
            store.create(User::generate("alice")).await,
            Err(CommonError::UserAlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn unknown_user_is_reported() {
        let store = InMemoryUserStore::new();
        assert!(matches!(
            store.get_by_name("ghost").await,
            Err(CommonError::UnknownUser(_))
        ));
    }
}
