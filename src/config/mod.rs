//! Configuration management for the role engine
//!
//! This module handles loading and validation of engine configuration,
//! with `ROLES_*` environment variables layered on top.

pub mod models;

pub use models::*;

use crate::auth::rbac::RoleCatalog;
use crate::utils::error::{Result, RoleError};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable overriding the cache TTL
pub const ENV_CACHE_TTL_SECS: &str = "ROLES_CACHE_TTL_SECS";
/// Environment variable overriding the store timeout
pub const ENV_STORE_TIMEOUT_MS: &str = "ROLES_STORE_TIMEOUT_MS";
/// Environment variable overriding the default audit context
pub const ENV_DEFAULT_CONTEXT: &str = "ROLES_DEFAULT_CONTEXT";
/// Environment variable overriding the audit queue capacity
pub const ENV_AUDIT_BUFFER: &str = "ROLES_AUDIT_BUFFER";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// Role engine configuration
    pub rbac: RbacConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RoleError::config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml(&content)?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let rbac: RbacConfig = serde_yaml::from_str(content)
            .map_err(|e| RoleError::config(format!("Failed to parse config: {}", e)))?;

        let config = Self { rbac };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::default().with_overrides(EnvOverrides::from_env()?)
    }

    /// Apply environment overrides on top of this configuration and revalidate
    pub fn with_overrides(self, overrides: EnvOverrides) -> Result<Self> {
        let config = Self {
            rbac: overrides.apply(self.rbac),
        };
        config.validate()?;
        Ok(config)
    }

    /// Get role engine configuration
    pub fn rbac(&self) -> &RbacConfig {
        &self.rbac
    }

    /// Validate the entire configuration, including the catalog
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.rbac
            .validate()
            .map_err(|e| RoleError::config(format!("RBAC config error: {}", e)))?;

        RoleCatalog::from_config(&self.rbac.catalog)?;

        debug!("Configuration validation completed");
        Ok(())
    }
}

/// Settings taken from `ROLES_*` environment variables.
///
/// Only variables that are actually set are `Some`; a variable set to the
/// default value still overrides a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub cache_ttl_secs: Option<u64>,
    pub store_timeout_ms: Option<u64>,
    pub default_context: Option<String>,
    pub audit_buffer_size: Option<usize>,
}

impl EnvOverrides {
    /// Read overrides from the process environment, after loading `.env`
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            cache_ttl_secs: env_parse(ENV_CACHE_TTL_SECS)?,
            store_timeout_ms: env_parse(ENV_STORE_TIMEOUT_MS)?,
            default_context: std::env::var(ENV_DEFAULT_CONTEXT).ok(),
            audit_buffer_size: env_parse(ENV_AUDIT_BUFFER)?,
        })
    }

    /// Overwrite every field that has an override
    pub fn apply(self, mut rbac: RbacConfig) -> RbacConfig {
        if let Some(ttl) = self.cache_ttl_secs {
            rbac.cache_ttl_secs = ttl;
        }
        if let Some(timeout) = self.store_timeout_ms {
            rbac.store_timeout_ms = timeout;
        }
        if let Some(context) = self.default_context {
            rbac.default_context = context;
        }
        if let Some(buffer) = self.audit_buffer_size {
            rbac.audit.buffer_size = buffer;
        }
        rbac
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| RoleError::config(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}
