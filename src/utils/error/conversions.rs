//! Type conversions into RoleError

use super::types::RoleError;

impl From<serde_yaml::Error> for RoleError {
    fn from(err: serde_yaml::Error) -> Self {
        RoleError::Config(format!("YAML error: {}", err))
    }
}

impl From<std::io::Error> for RoleError {
    fn from(err: std::io::Error) -> Self {
        RoleError::Config(format!("IO error: {}", err))
    }
}

impl From<tokio::task::JoinError> for RoleError {
    fn from(err: tokio::task::JoinError) -> Self {
        RoleError::Internal(format!("role lookup task failed: {}", err))
    }
}
