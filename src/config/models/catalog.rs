//! Role catalog configuration
//!
//! The catalog is injected data: which `resource:action` strings exist and
//! which roles hold them is a product decision, so it lives in configuration
//! rather than in code. The default below is the storefront catalog.

use crate::auth::rbac::Role;
use serde::{Deserialize, Serialize};

/// One role's entry in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Role being defined
    pub role: Role,
    /// Hierarchy level; higher levels satisfy minimum-role checks for lower ones
    pub level: u32,
    /// Permissions granted to this role, enumerated explicitly
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Roles whose permissions this role must fully contain.
    ///
    /// Checked at startup; nothing is inherited implicitly.
    #[serde(default)]
    pub superset_of: Vec<Role>,
}

impl RoleDefinition {
    fn new(role: Role, level: u32, permissions: &[&str], superset_of: &[Role]) -> Self {
        Self {
            role,
            level,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            superset_of: superset_of.to_vec(),
        }
    }
}

/// Catalog configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub roles: Vec<RoleDefinition>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        const CUSTOMER: &[&str] = &[
            "products:view",
            "orders:view",
            "orders:create",
            "orders:cancel",
            "profile:edit",
        ];

        let with = |extra: &[&'static str]| -> Vec<&'static str> {
            CUSTOMER.iter().chain(extra.iter()).copied().collect()
        };

        Self {
            roles: vec![
                RoleDefinition::new(Role::Customer, 10, CUSTOMER, &[]),
                RoleDefinition::new(
                    Role::InventoryStaff,
                    20,
                    &with(&[
                        "inventory:view",
                        "inventory:manage",
                        "products:edit",
                        "orders:fulfill",
                    ]),
                    &[Role::Customer],
                ),
                RoleDefinition::new(
                    Role::MarketingStaff,
                    20,
                    &with(&[
                        "promotions:view",
                        "promotions:manage",
                        "analytics:view",
                        "products:edit",
                    ]),
                    &[Role::Customer],
                ),
                RoleDefinition::new(
                    Role::Executive,
                    30,
                    &with(&[
                        "inventory:view",
                        "promotions:view",
                        "analytics:view",
                        "analytics:export",
                        "reports:view",
                    ]),
                    &[Role::Customer],
                ),
                // Admin is granted everything by the evaluator; only what
                // other roles do not already cover is listed here.
                RoleDefinition::new(
                    Role::Admin,
                    100,
                    &["users:manage", "roles:assign", "settings:edit"],
                    &[],
                ),
            ],
        }
    }
}
