//! Cache type definitions

use crate::auth::rbac::Role;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A resolved role held by the cache.
///
/// Never mutated in place: a refresh replaces the entry wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedRoleEntry {
    /// User the role belongs to
    pub user_id: String,
    /// Resolved role
    pub role: Role,
    /// When the role was fetched from the store
    pub fetched_at: Instant,
    /// When the entry stops being served
    pub expires_at: Instant,
}

impl CachedRoleEntry {
    pub fn new(user_id: impl Into<String>, role: Role, fetched_at: Instant, ttl: Duration) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            fetched_at,
            expires_at: fetched_at + ttl,
        }
    }

    /// Check if the entry is expired at `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry
    pub fn remaining(&self, now: Instant) -> Duration {
        self.expires_at.saturating_duration_since(now)
    }
}

/// Where a resolved role came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Served from a live cache entry
    Cache,
    /// This caller triggered the store fetch
    Store,
    /// This caller joined a fetch another caller had already started
    Joined,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Cache => "cache",
            ResolutionSource::Store => "store",
            ResolutionSource::Joined => "joined",
        }
    }
}

/// Result of a cache-through lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLookup {
    pub role: Role,
    pub source: ResolutionSource,
}

/// Cache statistics snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from a live entry
    pub hits: u64,
    /// Reads that found nothing
    pub misses: u64,
    /// Reads that found an expired entry
    pub expirations: u64,
    /// Store fetches started
    pub store_fetches: u64,
    /// Callers that joined an in-flight fetch
    pub coalesced: u64,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total_requests = self.hits + self.misses + self.expirations;
        if total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / total_requests as f64
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) expirations: AtomicU64,
    pub(crate) store_fetches: AtomicU64,
    pub(crate) coalesced: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            store_fetches: self.store_fetches.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }
}
