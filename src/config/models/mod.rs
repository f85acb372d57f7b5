//! Configuration data models
//!
//! This module defines all configuration structures used by the role engine.

pub mod audit;
pub mod catalog;
pub mod rbac;

// Re-export all configuration types
pub use audit::*;
pub use catalog::*;
pub use rbac::*;

/// Default cache TTL in seconds
pub fn default_cache_ttl_secs() -> u64 {
    300
}

/// Default user store timeout in milliseconds
pub fn default_store_timeout_ms() -> u64 {
    3000
}

/// Default audit context tag for unscoped checks
pub fn default_context() -> String {
    "app".to_string()
}

/// Default audit queue capacity
pub fn default_audit_buffer_size() -> usize {
    1024
}
