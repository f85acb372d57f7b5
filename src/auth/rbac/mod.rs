//! Role-Based Access Control (RBAC) engine
//!
//! Role resolution, permission expansion, hierarchy comparison and the
//! audited facade the rest of the application calls.

mod catalog;
mod evaluator;
mod resolver;
mod service;
mod types;

// Re-export public types and structs
pub use catalog::{CatalogEntry, RoleCatalog};
pub use evaluator::PermissionEvaluator;
pub use resolver::{Resolution, RoleResolver};
pub use service::{FeatureScope, UnifiedRoleService};
pub use types::{Decision, Grant, Permission, PermissionCheck, Role};
