//! The volatile session cache: a serialized [`Session`] keyed by
//! `"from: {from}, to: {to}"` with a 2-hour TTL, mirroring the production
//! Redis-backed cache but implemented in-process since that cache is an
//! external collaborator.

use protocol::session::Session;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

fn cache_key(from: &str, to: &str) -> String {
    format!("from: {from}, to: {to}")
}

struct CacheEntry {
    session: Session,
    expires_at: Instant,
}

pub trait SessionCache {
    async fn save(&self, from: &str, to: &str, session: Session);
    async fn load(&self, from: &str, to: &str) -> Option<Session>;
}

/// An in-process stand-in for the production Redis-backed session cache.
#[derive(Clone, Default)]
pub struct InMemorySessionCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl InMemorySessionCache {
    pub fn new() -> Self {
        InMemorySessionCache {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl SessionCache for InMemorySessionCache {
    async fn save(&self, from: &str, to: &str, session: Session) {
        let mut guard = self.entries.write().await;
        guard.insert(
            cache_key(from, to),
            CacheEntry {
                session,
                expires_at: Instant::now() + SESSION_TTL,
            },
        );
    }

    async fn load(&self, from: &str, to: &str) -> Option<Session> {
        let key = cache_key(from, to);
        let mut guard = self.entries.write().await;
        match guard.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.session.clone()),
            Some(_) => {
                guard.remove(&key);
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let cache = InMemorySessionCache::new();
        cache.save("alice", "bob", Session::new()).await;
        let reloaded = cache.load("alice", "bob").await;
        assert!(reloaded.is_some());
    }

    #[tokio::test]
    async fn miss_for_unknown_pair() {
        let cache = InMemorySessionCache::new();
        assert!(cache.load("alice", "bob").await.is_none());
    }

    #[tokio::test]
    async fn key_is_directional() {
        let cache = InMemorySessionCache::new();
        cache.save("alice", "bob", Session::new()).await;
        assert!(cache.load("bob", "alice").await.is_none());
    }
}
