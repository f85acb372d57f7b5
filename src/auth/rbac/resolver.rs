//! Role resolution
//!
//! Maps a user id to exactly one catalog role: cache first, then a single
//! flighted, time-bounded user store lookup whose raw answer is parsed
//! strictly. There is no fallback role; every failure is a typed error.

use crate::auth::store::UserStore;
use crate::core::cache::{PermissionCache, ResolutionSource};
use crate::utils::error::{Result, RoleError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::catalog::RoleCatalog;
use super::types::Role;

/// A resolved role and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub role: Role,
    pub source: ResolutionSource,
}

/// Resolves user ids to roles through the cache
#[derive(Clone)]
pub struct RoleResolver {
    catalog: Arc<RoleCatalog>,
    store: Arc<dyn UserStore>,
    cache: PermissionCache,
    store_timeout: Duration,
}

impl std::fmt::Debug for RoleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleResolver")
            .field("cache", &self.cache)
            .field("store_timeout", &self.store_timeout)
            .finish()
    }
}

impl RoleResolver {
    pub fn new(
        catalog: Arc<RoleCatalog>,
        store: Arc<dyn UserStore>,
        cache: PermissionCache,
        store_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            store,
            cache,
            store_timeout,
        }
    }

    pub fn cache(&self) -> &PermissionCache {
        &self.cache
    }

    /// Resolve a user's role.
    ///
    /// Fails with `RoleNotFound` when the store has no record,
    /// `StoreUnavailable` when the store errors or exceeds the timeout, and
    /// `UnknownRole` when the stored value is not a catalog role.
    pub async fn resolve(&self, user_id: &str) -> Result<Resolution> {
        if user_id.trim().is_empty() {
            return Err(RoleError::role_not_found(user_id));
        }

        let catalog = Arc::clone(&self.catalog);
        let store = Arc::clone(&self.store);
        let timeout = self.store_timeout;
        let owned_id = user_id.to_string();

        let lookup = self
            .cache
            .get_or_fetch(user_id, move || {
                fetch_role(catalog, store, owned_id, timeout)
            })
            .await?;

        debug!(user_id, role = %lookup.role, source = lookup.source.as_str(), "role resolved");
        Ok(Resolution {
            role: lookup.role,
            source: lookup.source,
        })
    }

    /// Drop a user's cached role
    pub fn invalidate(&self, user_id: &str) -> bool {
        self.cache.invalidate(user_id)
    }
}

async fn fetch_role(
    catalog: Arc<RoleCatalog>,
    store: Arc<dyn UserStore>,
    user_id: String,
    timeout: Duration,
) -> Result<Role> {
    let raw = match tokio::time::timeout(timeout, store.lookup_role(&user_id)).await {
        Ok(Ok(Some(raw))) => raw,
        Ok(Ok(None)) => {
            debug!(user_id = %user_id, "no role on record");
            return Err(RoleError::role_not_found(user_id));
        }
        Ok(Err(e)) => {
            error!(user_id = %user_id, error = %e, "user store lookup failed");
            return Err(RoleError::store_unavailable(e.to_string()));
        }
        Err(_) => {
            error!(user_id = %user_id, timeout_ms = timeout.as_millis() as u64, "user store lookup timed out");
            return Err(RoleError::store_unavailable(format!(
                "lookup timed out after {}ms",
                timeout.as_millis()
            )));
        }
    };

    match raw.parse::<Role>() {
        Ok(role) if catalog.contains_role(role) => Ok(role),
        _ => {
            warn!(user_id = %user_id, value = %raw, "stored role is not in the catalog");
            Err(RoleError::unknown_role(user_id, raw))
        }
    }
}
