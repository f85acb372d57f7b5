//! Resolved-role cache
//!
//! TTL-keyed store of resolved roles per user, with single-flight
//! de-duplication of concurrent misses. Expiry is checked on read; there is
//! no background eviction.

pub mod clock;
pub mod manager;
pub mod types;


pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::PermissionCache;
pub use types::{CacheLookup, CacheStats, CachedRoleEntry, ResolutionSource};
