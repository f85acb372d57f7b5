//! Permission cache with single-flight store fetches

use crate::auth::rbac::Role;
use crate::utils::error::{Result, RoleError};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::types::{CacheCounters, CacheLookup, CacheStats, CachedRoleEntry, ResolutionSource};

type SharedFetch = Shared<BoxFuture<'static, Result<Role>>>;

/// A store fetch other callers can join
#[derive(Clone)]
struct InFlight {
    id: u64,
    result: SharedFetch,
}

/// Cache of resolved roles keyed by user id.
///
/// Clones share state. Lock order is always `in_flight` before `entries`.
#[derive(Clone)]
pub struct PermissionCache {
    entries: Arc<DashMap<String, CachedRoleEntry>>,
    in_flight: Arc<DashMap<String, InFlight>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    counters: Arc<CacheCounters>,
    next_flight: Arc<AtomicU64>,
}

impl std::fmt::Debug for PermissionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionCache")
            .field("entries", &self.entries.len())
            .field("in_flight", &self.in_flight.len())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl PermissionCache {
    /// Create a cache on the system clock
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, Arc::new(SystemClock))
    }

    /// Create a cache on a caller-supplied clock
    pub fn with_clock(default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            in_flight: Arc::new(DashMap::new()),
            default_ttl,
            clock,
            counters: Arc::new(CacheCounters::default()),
            next_flight: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a live entry. An expired entry is dropped and reads as a miss.
    pub fn get(&self, user_id: &str) -> Option<CachedRoleEntry> {
        let now = self.clock.now();
        let cached = self.entries.get(user_id).map(|entry| entry.clone());

        match cached {
            Some(entry) if !entry.is_expired(now) => {
                CacheCounters::bump(&self.counters.hits);
                debug!(
                    user_id,
                    role = %entry.role,
                    ttl_remaining_secs = entry.remaining(now).as_secs(),
                    "role cache hit"
                );
                Some(entry)
            }
            Some(_) => {
                self.entries.remove_if(user_id, |_, entry| entry.is_expired(now));
                CacheCounters::bump(&self.counters.expirations);
                debug!(user_id, "role cache entry expired");
                None
            }
            None => {
                CacheCounters::bump(&self.counters.misses);
                debug!(user_id, "role cache miss");
                None
            }
        }
    }

    /// Store a resolved role, replacing any previous entry
    pub fn put(&self, user_id: &str, role: Role, ttl: Duration) {
        let entry = CachedRoleEntry::new(user_id, role, self.clock.now(), ttl);
        self.entries.insert(user_id.to_string(), entry);
    }

    /// Remove a user's entry so the next lookup is a hard miss.
    ///
    /// A fetch already in flight for the user is detached: its waiters still
    /// get its result, but it will not populate the cache.
    pub fn invalidate(&self, user_id: &str) -> bool {
        let detached = self.in_flight.remove(user_id).is_some();
        let removed = self.entries.remove(user_id).is_some();
        debug!(user_id, removed, detached, "role cache entry invalidated");
        removed
    }

    /// Drop every entry and detach every in-flight fetch.
    ///
    /// Used when the role catalog is reloaded, since cached roles were
    /// resolved against the old one.
    pub fn invalidate_all(&self) {
        self.in_flight.clear();
        self.entries.clear();
        debug!("role cache cleared");
    }

    /// Number of stored entries, expired ones included until read
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Read through the cache, collapsing concurrent misses into one fetch.
    ///
    /// The fetch runs on its own task: callers that stop waiting do not cancel
    /// it, and its result still lands in the cache for the next caller.
    /// Failures are handed to every waiter but never cached.
    pub async fn get_or_fetch<F, Fut>(&self, user_id: &str, fetch: F) -> Result<CacheLookup>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Role>> + Send + 'static,
    {
        if let Some(entry) = self.get(user_id) {
            return Ok(CacheLookup {
                role: entry.role,
                source: ResolutionSource::Cache,
            });
        }

        let (fetch_result, source) = match self.in_flight.entry(user_id.to_string()) {
            Entry::Occupied(flight) => {
                CacheCounters::bump(&self.counters.coalesced);
                debug!(user_id, "joining in-flight role fetch");
                (flight.get().result.clone(), ResolutionSource::Joined)
            }
            Entry::Vacant(slot) => {
                // A fetch may have completed between the miss and taking the slot.
                if let Some(role) = self.peek_live(user_id) {
                    return Ok(CacheLookup {
                        role,
                        source: ResolutionSource::Cache,
                    });
                }

                let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
                let task = tokio::spawn(self.clone().complete_flight(
                    user_id.to_string(),
                    id,
                    fetch(),
                ));
                let result = async move {
                    match task.await {
                        Ok(result) => result,
                        Err(e) => Err(RoleError::from(e)),
                    }
                }
                .boxed()
                .shared();

                slot.insert(InFlight {
                    id,
                    result: result.clone(),
                });
                CacheCounters::bump(&self.counters.store_fetches);
                debug!(user_id, flight = id, "started role fetch");
                (result, ResolutionSource::Store)
            }
        };

        let role = fetch_result.await?;
        Ok(CacheLookup { role, source })
    }

    fn peek_live(&self, user_id: &str) -> Option<Role> {
        let now = self.clock.now();
        self.entries
            .get(user_id)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.role)
    }

    async fn complete_flight<Fut>(self, user_id: String, id: u64, fetch: Fut) -> Result<Role>
    where
        Fut: Future<Output = Result<Role>> + Send + 'static,
    {
        // Dropped on every exit, including a panic inside `fetch`.
        let flight = FlightGuard {
            cache: self,
            user_id,
            id,
        };

        let result = fetch.await;
        if let Ok(role) = &result {
            flight.populate(*role);
        }
        result
    }
}

/// Owns one in-flight slot; clears it on drop unless it was detached
struct FlightGuard {
    cache: PermissionCache,
    user_id: String,
    id: u64,
}

impl FlightGuard {
    /// Cache the fetched role if this flight is still the current one
    fn populate(&self, role: Role) {
        if let Some(flight) = self.cache.in_flight.get(&self.user_id) {
            if flight.id == self.id {
                self.cache.put(&self.user_id, role, self.cache.default_ttl);
            }
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let id = self.id;
        let cleared = self
            .cache
            .in_flight
            .remove_if(&self.user_id, |_, flight| flight.id == id)
            .is_some();
        if cleared && std::thread::panicking() {
            debug!(user_id = %self.user_id, flight = id, "role fetch panicked, flight cleared");
        }
    }
}
