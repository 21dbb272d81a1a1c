//! # Secret Value Cache
//!
//! Per-handler cache keyed by version id, then version stage.
//!
//! Values are handles to in-progress-or-complete operations, so a handle can be
//! stored before the remote call resolves and every later reader attaches to the
//! same operation. Expiry is checked lazily on read; expired entries stay in the
//! map until overwritten or cleared.

use crate::constants::DEFAULT_CACHE_TTL_SECS;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Upper bound on the entry lifetime, keeps `Instant` arithmetic in range
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

struct CacheEntry<V> {
    expires_at: Instant,
    value: V,
}

/// Two-level cache: version id -> version stage -> entry
///
/// Cleared slots are set to `None`; the maps themselves are never pruned.
pub struct SecretValueCache<V> {
    ttl: Duration,
    entries: HashMap<String, HashMap<String, Option<CacheEntry<V>>>>,
}

impl<V> std::fmt::Debug for SecretValueCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let populated = self
            .entries
            .values()
            .flat_map(HashMap::values)
            .filter(|slot| slot.is_some())
            .count();
        f.debug_struct("SecretValueCache")
            .field("ttl", &self.ttl)
            .field("populated", &populated)
            .finish()
    }
}

impl<V: Clone> Default for SecretValueCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> SecretValueCache<V> {
    /// Cache with the default 24 hour lifetime
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: ttl.min(MAX_TTL),
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store `value`, expiring `ttl` from now
    ///
    /// `value` may be a handle whose operation has not completed yet.
    pub fn set(&mut self, version_id: &str, version_stage: &str, value: V) {
        let expires_at = Instant::now() + self.ttl;

        self.entries
            .entry(version_id.to_string())
            .or_default()
            .insert(
                version_stage.to_string(),
                Some(CacheEntry { expires_at, value }),
            );
    }

    /// The stored handle, if present and not expired
    pub fn get(&self, version_id: &str, version_stage: &str) -> Option<V> {
        let entry = self.entries.get(version_id)?.get(version_stage)?.as_ref()?;

        (entry.expires_at >= Instant::now()).then(|| entry.value.clone())
    }

    /// Null out the slot. No-op for keys that were never populated.
    pub fn clear(&mut self, version_id: &str, version_stage: &str) {
        if let Some(slot) = self.slot_mut(version_id, version_stage) {
            *slot = None;
        }
    }

    /// Null out the slot only if the stored handle matches `predicate`
    ///
    /// Returns whether the slot was cleared.
    pub fn clear_if<P>(&mut self, version_id: &str, version_stage: &str, predicate: P) -> bool
    where
        P: FnOnce(&V) -> bool,
    {
        let Some(slot) = self.slot_mut(version_id, version_stage) else {
            return false;
        };

        if slot.as_ref().is_some_and(|entry| predicate(&entry.value)) {
            *slot = None;
            true
        } else {
            false
        }
    }

    fn slot_mut(
        &mut self,
        version_id: &str,
        version_stage: &str,
    ) -> Option<&mut Option<CacheEntry<V>>> {
        self.entries.get_mut(version_id)?.get_mut(version_stage)
    }
}
