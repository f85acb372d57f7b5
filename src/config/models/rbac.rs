//! Role engine configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RbacConfig {
    /// How long a resolved role stays valid in the cache, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Upper bound on a single user store lookup, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
    /// Context tag recorded for checks made outside a feature scope
    #[serde(default = "default_context")]
    pub default_context: String,
    /// Audit sink configuration
    #[serde(default)]
    pub audit: AuditConfig,
    /// Role to permission catalog
    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            store_timeout_ms: default_store_timeout_ms(),
            default_context: default_context(),
            audit: AuditConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl RbacConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Validate scalar settings; the catalog is validated when it is built
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_ttl_secs == 0 {
            return Err("cache_ttl_secs must be greater than zero".to_string());
        }

        if self.store_timeout_ms == 0 {
            return Err("store_timeout_ms must be greater than zero".to_string());
        }

        if self.default_context.trim().is_empty() {
            return Err("default_context cannot be empty".to_string());
        }

        self.audit.validate()
    }
}
