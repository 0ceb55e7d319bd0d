//! TTL-based caching for user profiles.

use crate::backend::UserProfile;
use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

/// A key derived from an access token, used for cache lookups.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SessionKey(String);

impl SessionKey {
    /// Creates a session key from a bearer token.
    ///
    /// The token is hashed so it is never stored.
    pub fn from_token(token: &str) -> Self {
        let digest = Sha256::digest(token.as_bytes());
        // First 16 bytes as hex
        let hash = digest[..16].iter().map(|b| format!("{:02x}", b)).collect();
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show first 8 chars
        write!(f, "{}...", &self.0[..8.min(self.0.len())])
    }
}

#[derive(Clone)]
struct CachedProfile {
    profile: UserProfile,
    cached_at: Instant,
}

/// Thread-safe cache of profiles keyed by session.
pub struct ProfileCache {
    entries: DashMap<SessionKey, CachedProfile>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Gets a cached profile if it exists and hasn't expired.
    pub fn get(&self, key: &SessionKey) -> Option<UserProfile> {
        self.entries.get(key).and_then(|entry| {
            if entry.cached_at.elapsed() < self.ttl {
                Some(entry.profile.clone())
            } else {
                drop(entry);
                self.entries.remove(key);
                None
            }
        })
    }

    pub fn insert(&self, key: SessionKey, profile: UserProfile) {
        self.entries.insert(
            key,
            CachedProfile {
                profile,
                cached_at: Instant::now(),
            },
        );
    }

    pub fn invalidate(&self, key: &SessionKey) {
        self.entries.remove(key);
    }

    /// Drops every cached copy of a user's profile, whichever session cached it.
    pub fn invalidate_user(&self, user_id: &str) {
        self.entries.retain(|_, entry| entry.profile.id != user_id);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes expired entries from the cache.
    pub fn cleanup_expired(&self) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.cached_at.elapsed() < ttl);
    }

    pub fn stats(&self) -> CacheStats {
        let mut total = 0;
        let mut expired = 0;

        for entry in self.entries.iter() {
            total += 1;
            if entry.cached_at.elapsed() >= self.ttl {
                expired += 1;
            }
        }

        CacheStats {
            total_entries: total,
            expired_entries: expired,
            active_entries: total - expired,
        }
    }
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Role;
    use crate::schedule::Gender;

    fn profile(id: &str) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            email: format!("{id}@ugrad.iiuc.ac.bd"),
            name: id.to_string(),
            university_id: format!("C{id}"),
            mobile: String::new(),
            gender: Gender::Female,
            role: Role::Student,
            created_at: None,
        }
    }

    #[test]
    fn test_session_key_hashing() {
        let key1 = SessionKey::from_token("token123");
        let key2 = SessionKey::from_token("token123");
        let key3 = SessionKey::from_token("token456");

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
        assert_eq!(key1.as_str().len(), 32);
        assert!(!key1.as_str().contains("token"));
        assert_eq!(key1.to_string().len(), 11);
    }

    #[test]
    fn test_get_and_invalidate() {
        let cache = ProfileCache::default();
        let key = SessionKey::from_token("t");
        cache.insert(key.clone(), profile("u1"));

        assert_eq!(cache.get(&key).unwrap().id, "u1");
        cache.invalidate(&key);
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = ProfileCache::new(Duration::ZERO);
        let key = SessionKey::from_token("t");
        cache.insert(key.clone(), profile("u1"));

        assert_eq!(cache.stats().expired_entries, 1);
        assert!(cache.get(&key).is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_invalidate_user_across_sessions() {
        let cache = ProfileCache::default();
        cache.insert(SessionKey::from_token("a"), profile("u1"));
        cache.insert(SessionKey::from_token("b"), profile("u1"));
        cache.insert(SessionKey::from_token("c"), profile("u2"));

        cache.invalidate_user("u1");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().active_entries, 1);
    }
}
