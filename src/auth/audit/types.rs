//! Audit event model

use crate::auth::rbac::{Grant, Role};
use crate::utils::error::{ErrorKind, RoleError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What was asked of the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditQuery {
    /// Plain role lookup
    GetRole,
    /// Single permission check
    Permission { permission: String },
    /// Check passing if any listed permission is held
    AnyPermission { permissions: Vec<String> },
    /// Hierarchy gate
    MinimumRole { required: Role },
    /// A user's stored role was changed and the cache invalidated
    RoleChanged,
}

impl AuditQuery {
    pub fn label(&self) -> &'static str {
        match self {
            AuditQuery::GetRole => "get_role",
            AuditQuery::Permission { .. } => "permission",
            AuditQuery::AnyPermission { .. } => "any_permission",
            AuditQuery::MinimumRole { .. } => "minimum_role",
            AuditQuery::RoleChanged => "role_changed",
        }
    }
}

/// How the engine answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Access granted, and by which rule
    Granted { grant: Grant },
    /// Access explicitly denied
    Denied,
    /// Role lookup succeeded
    Resolved,
    /// Cached role discarded after a role change
    Invalidated,
    /// The call failed; access could not be determined
    Error { kind: ErrorKind },
}

impl AuditOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AuditOutcome::Granted { .. } => "granted",
            AuditOutcome::Denied => "denied",
            AuditOutcome::Resolved => "resolved",
            AuditOutcome::Invalidated => "invalidated",
            AuditOutcome::Error { .. } => "error",
        }
    }
}

impl From<&RoleError> for AuditOutcome {
    fn from(err: &RoleError) -> Self {
        AuditOutcome::Error { kind: err.kind() }
    }
}

/// Immutable record of one decision or role mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event id
    pub id: Uuid,
    /// Subject of the decision
    pub user_id: String,
    /// What was asked
    pub query: AuditQuery,
    /// What was answered
    pub outcome: AuditOutcome,
    /// Role the decision was made with, when one was resolved
    pub role: Option<Role>,
    /// Feature area that triggered the check
    pub context: String,
    /// When the decision was made
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        user_id: impl Into<String>,
        query: AuditQuery,
        outcome: AuditOutcome,
        context: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            query,
            outcome,
            role: None,
            context: context.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_role(mut self, role: Option<Role>) -> Self {
        self.role = role;
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, AuditOutcome::Error { .. })
    }

    pub fn is_admin_override(&self) -> bool {
        matches!(
            self.outcome,
            AuditOutcome::Granted {
                grant: Grant::AdminOverride
            }
        )
    }
}
