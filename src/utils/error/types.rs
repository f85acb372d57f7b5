//! Error types for the role engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for the role engine
pub type Result<T> = std::result::Result<T, RoleError>;

/// Main error type for the role engine
///
/// Every variant carries owned data only, so one resolution outcome can be
/// cloned out to every caller that joined the same in-flight lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    /// The user store has no role on record for this user
    #[error("Role not found for user '{user_id}'")]
    RoleNotFound { user_id: String },

    /// The stored role string is not part of the role catalog
    #[error("Unknown role '{value}' stored for user '{user_id}'")]
    UnknownRole { user_id: String, value: String },

    /// The user store could not be reached or timed out
    #[error("User store unavailable: {0}")]
    StoreUnavailable(String),

    /// Caller supplied a permission outside the catalog or of the wrong shape
    #[error("Invalid permission '{permission}': {reason}")]
    InvalidPermission { permission: String, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable discriminant of [`RoleError`], recorded in audit events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RoleNotFound,
    UnknownRole,
    StoreUnavailable,
    InvalidPermission,
    Config,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::RoleNotFound => "role_not_found",
            ErrorKind::UnknownRole => "unknown_role",
            ErrorKind::StoreUnavailable => "store_unavailable",
            ErrorKind::InvalidPermission => "invalid_permission",
            ErrorKind::Config => "config",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}
