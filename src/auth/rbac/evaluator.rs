//! Permission evaluation
//!
//! Pure decisions over a resolved role. Auditing is the facade's job, so
//! nothing here has side effects beyond diagnostic logging.

use crate::utils::error::{Result, RoleError};
use std::sync::Arc;
use tracing::warn;

use super::catalog::RoleCatalog;
use super::types::{Decision, Grant, Permission, PermissionCheck, Role};

/// Decides allow/deny for a role and a permission
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    catalog: Arc<RoleCatalog>,
}

impl PermissionEvaluator {
    pub fn new(catalog: Arc<RoleCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    /// Evaluate a permission for a role.
    ///
    /// Admin is allowed unconditionally, including well-formed permissions the
    /// catalog does not list. For every other role a permission unknown to the
    /// catalog is rejected with `InvalidPermission` rather than denied.
    pub fn evaluate(&self, role: Role, permission: &Permission) -> Result<Decision> {
        if role.is_admin() {
            return Ok(Decision::Allow(Grant::AdminOverride));
        }

        if !self.catalog.is_valid_permission(permission.as_str()) {
            return Err(RoleError::invalid_permission(
                permission.as_str(),
                "not present in the role catalog",
            ));
        }

        if self.catalog.permissions_for(role).contains(permission) {
            Ok(Decision::Allow(Grant::Catalog))
        } else {
            Ok(Decision::Deny)
        }
    }

    /// True iff `role` sits at or above `required` in the hierarchy.
    ///
    /// A role the catalog does not define never meets, and is never met.
    pub fn meets_minimum_role(&self, role: Role, required: Role) -> bool {
        match (self.catalog.level(role), self.catalog.level(required)) {
            (Some(level), Some(required_level)) => level >= required_level,
            _ => {
                warn!(%role, %required, "minimum role check against a role outside the catalog");
                false
            }
        }
    }

    /// Detailed evaluation for diagnostics
    pub fn explain(&self, role: Role, permission: &Permission) -> Result<PermissionCheck> {
        let check = match self.evaluate(role, permission)? {
            Decision::Allow(grant) => PermissionCheck {
                granted: true,
                grant: Some(grant),
                denial_reason: None,
            },
            Decision::Deny => PermissionCheck {
                granted: false,
                grant: None,
                denial_reason: Some(format!("Role '{}' lacks permission: {}", role, permission)),
            },
        };
        Ok(check)
    }
}
