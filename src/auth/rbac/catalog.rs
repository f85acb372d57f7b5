//! Role catalog: role to permission set and hierarchy level

use crate::config::CatalogConfig;
use crate::utils::error::{Result, RoleError};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use super::types::{Permission, Role};

static NO_PERMISSIONS: BTreeSet<Permission> = BTreeSet::new();

/// Catalog entry for a single role
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    /// Hierarchy level
    pub level: u32,
    /// Explicitly enumerated permissions
    pub permissions: BTreeSet<Permission>,
}

/// Immutable mapping from role to permissions and hierarchy level.
///
/// Built once at startup from [`CatalogConfig`]; construction fails on any
/// malformed permission, duplicate role, misplaced admin level, or a declared
/// superset relation that the enumeration does not honour.
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    entries: HashMap<Role, CatalogEntry>,
    known: BTreeSet<Permission>,
}

impl RoleCatalog {
    /// Build and validate a catalog from configuration
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        debug!("Building role catalog from {} definitions", config.roles.len());

        if config.roles.is_empty() {
            return Err(RoleError::config("role catalog must define at least one role"));
        }

        let mut entries = HashMap::with_capacity(config.roles.len());
        for definition in &config.roles {
            let permissions = definition
                .permissions
                .iter()
                .map(|p| Permission::parse(p))
                .collect::<Result<BTreeSet<_>>>()
                .map_err(|e| {
                    RoleError::config(format!("role '{}': {}", definition.role, e))
                })?;

            let entry = CatalogEntry {
                level: definition.level,
                permissions,
            };
            if entries.insert(definition.role, entry).is_some() {
                return Err(RoleError::config(format!(
                    "role '{}' is defined more than once",
                    definition.role
                )));
            }
        }

        if let Some(admin) = entries.get(&Role::Admin) {
            let outranked = entries
                .iter()
                .find(|(role, entry)| !role.is_admin() && entry.level >= admin.level);
            if let Some((role, _)) = outranked {
                return Err(RoleError::config(format!(
                    "admin level must be strictly highest, but '{}' is at or above it",
                    role
                )));
            }
        }

        for definition in &config.roles {
            let entry = &entries[&definition.role];
            for lower in &definition.superset_of {
                let lower_entry = entries.get(lower).ok_or_else(|| {
                    RoleError::config(format!(
                        "role '{}' is declared a superset of undefined role '{}'",
                        definition.role, lower
                    ))
                })?;

                if lower_entry.level > entry.level {
                    return Err(RoleError::config(format!(
                        "role '{}' cannot be a superset of higher-level role '{}'",
                        definition.role, lower
                    )));
                }

                let missing: Vec<&str> = lower_entry
                    .permissions
                    .difference(&entry.permissions)
                    .map(Permission::as_str)
                    .collect();
                if !missing.is_empty() {
                    return Err(RoleError::config(format!(
                        "role '{}' is declared a superset of '{}' but lacks: {}",
                        definition.role,
                        lower,
                        missing.join(", ")
                    )));
                }
            }
        }

        let known = entries
            .values()
            .flat_map(|entry| entry.permissions.iter().cloned())
            .collect::<BTreeSet<_>>();

        info!(
            roles = entries.len(),
            permissions = known.len(),
            "Role catalog loaded"
        );
        Ok(Self { entries, known })
    }

    /// Permissions explicitly enumerated for a role.
    ///
    /// Admin's override is not reflected here; see the evaluator.
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Permission> {
        self.entries
            .get(&role)
            .map(|entry| &entry.permissions)
            .unwrap_or(&NO_PERMISSIONS)
    }

    /// Hierarchy level of a role, if the catalog defines it
    pub fn level(&self, role: Role) -> Option<u32> {
        self.entries.get(&role).map(|entry| entry.level)
    }

    /// Whether a permission string is one the catalog knows about
    pub fn is_valid_permission(&self, permission: &str) -> bool {
        self.known.contains(permission)
    }

    pub fn contains_role(&self, role: Role) -> bool {
        self.entries.contains_key(&role)
    }

    /// Defined roles, lowest level first
    pub fn roles(&self) -> Vec<(Role, u32)> {
        let mut roles: Vec<(Role, u32)> = self
            .entries
            .iter()
            .map(|(role, entry)| (*role, entry.level))
            .collect();
        roles.sort_by_key(|(role, level)| (*level, role.as_str()));
        roles
    }

    /// Every permission any role is granted
    pub fn all_permissions(&self) -> &BTreeSet<Permission> {
        &self.known
    }
}
