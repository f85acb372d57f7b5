//! Helper functions for creating and classifying errors

use super::types::{ErrorKind, RoleError};

impl RoleError {
    pub fn role_not_found<S: Into<String>>(user_id: S) -> Self {
        Self::RoleNotFound {
            user_id: user_id.into(),
        }
    }

    pub fn unknown_role<U: Into<String>, V: Into<String>>(user_id: U, value: V) -> Self {
        Self::UnknownRole {
            user_id: user_id.into(),
            value: value.into(),
        }
    }

    pub fn store_unavailable<S: Into<String>>(message: S) -> Self {
        Self::StoreUnavailable(message.into())
    }

    pub fn invalid_permission<P: Into<String>, R: Into<String>>(permission: P, reason: R) -> Self {
        Self::InvalidPermission {
            permission: permission.into(),
            reason: reason.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Audit-friendly discriminant of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoleError::RoleNotFound { .. } => ErrorKind::RoleNotFound,
            RoleError::UnknownRole { .. } => ErrorKind::UnknownRole,
            RoleError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            RoleError::InvalidPermission { .. } => ErrorKind::InvalidPermission,
            RoleError::Config(_) => ErrorKind::Config,
            RoleError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry with backoff.
    ///
    /// Only transient store faults qualify; the engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RoleError::StoreUnavailable(_))
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> &'static str {
        match self {
            RoleError::RoleNotFound { .. } | RoleError::UnknownRole { .. } => {
                "Access denied, please contact support"
            }
            RoleError::StoreUnavailable(_) => {
                "Unable to verify access right now, please try again"
            }
            RoleError::InvalidPermission { .. }
            | RoleError::Config(_)
            | RoleError::Internal(_) => "Something went wrong, please contact support",
        }
    }
}
