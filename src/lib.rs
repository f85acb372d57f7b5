//! # unified-roles
//!
//! Unified role and permission resolution engine for the storefront.
//!
//! An already-authenticated user id goes in; a role, a permission decision
//! and an audit event come out. Roles are resolved through a TTL cache that
//! collapses concurrent misses into a single user store lookup, and every
//! failure is a typed error rather than a fallback role.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use unified_roles::{
//!     InMemoryUserStore, RbacConfig, TracingAuditSink, UnifiedRoleService,
//! };
//!
//! # async fn run() -> unified_roles::Result<()> {
//! let store = Arc::new(InMemoryUserStore::new());
//! store.set_role("u-1001", "customer");
//!
//! let roles = UnifiedRoleService::from_config(
//!     &RbacConfig::default(),
//!     store,
//!     Arc::new(TracingAuditSink),
//! )?;
//!
//! let checkout = roles.scoped("checkout");
//! assert!(checkout.has_permission("u-1001", "orders:create").await?);
//! assert!(!checkout.has_permission("u-1001", "inventory:manage").await?);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

// Re-export main types
pub use auth::audit::{
    AuditEvent, AuditOutcome, AuditQuery, AuditSink, ChannelAuditSink, MemoryAuditSink,
    TracingAuditSink,
};
pub use auth::rbac::{
    Decision, FeatureScope, Grant, Permission, PermissionEvaluator, Role, RoleCatalog,
    RoleResolver, UnifiedRoleService,
};
pub use auth::store::{InMemoryUserStore, StoreError, UserStore};
pub use config::{CatalogConfig, Config, EnvOverrides, RbacConfig, RoleDefinition};
pub use crate::core::cache::{CacheStats, Clock, ManualClock, PermissionCache, SystemClock};
pub use utils::error::{ErrorKind, Result, RoleError};
