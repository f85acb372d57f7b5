//! RBAC type definitions

use crate::utils::error::{Result, RoleError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static PERMISSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*:[a-z][a-z0-9_]*$").expect("Invalid permission regex")
});

/// Authorization identity category assigned to a user.
///
/// The set is closed: values coming from the user store are parsed strictly,
/// never inferred. Hierarchy levels are not part of the type; they come from
/// the injected [`RoleCatalog`](super::RoleCatalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Shopper account
    Customer,
    /// Warehouse and stock staff
    InventoryStaff,
    /// Promotions and campaigns staff
    MarketingStaff,
    /// Read-mostly business leadership
    Executive,
    /// Administrator, satisfies every permission query
    Admin,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 5] = [
        Role::Customer,
        Role::InventoryStaff,
        Role::MarketingStaff,
        Role::Executive,
        Role::Admin,
    ];

    /// Canonical wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::InventoryStaff => "inventory_staff",
            Role::MarketingStaff => "marketing_staff",
            Role::Executive => "executive",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "customer" => Ok(Role::Customer),
            "inventory_staff" => Ok(Role::InventoryStaff),
            "marketing_staff" => Ok(Role::MarketingStaff),
            "executive" => Ok(Role::Executive),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A `resource:action` permission string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

impl Permission {
    /// Parse and shape-check a permission string
    pub fn parse(value: &str) -> Result<Self> {
        if PERMISSION_PATTERN.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(RoleError::invalid_permission(
                value,
                "expected lowercase 'resource:action'",
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resource part, before the colon
    pub fn resource(&self) -> &str {
        self.0.split_once(':').map(|(r, _)| r).unwrap_or(&self.0)
    }

    /// Action part, after the colon
    pub fn action(&self) -> &str {
        self.0.split_once(':').map(|(_, a)| a).unwrap_or_default()
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Ordering and hashing match the inner string, so sets can be queried by `&str`.
impl std::borrow::Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Permission {
    type Error = RoleError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.0
    }
}

/// How an allow decision was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grant {
    /// Permission is enumerated for the role in the catalog
    Catalog,
    /// Admin bypass
    AdminOverride,
    /// Role sits at or above the required hierarchy level
    Hierarchy,
}

/// Outcome of a permission evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow(Grant),
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

/// Permission check result, for diagnostics
#[derive(Debug, Clone)]
pub struct PermissionCheck {
    /// Whether permission is granted
    pub granted: bool,
    /// How the permission was granted, if it was
    pub grant: Option<Grant>,
    /// Reason for denial (if not granted)
    pub denial_reason: Option<String>,
}
