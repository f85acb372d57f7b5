//! User store boundary
//!
//! The authoritative role lives in an external store. The engine only ever
//! asks it one question, and treats the answer as an untrusted raw string
//! until the resolver has parsed it against the catalog.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::debug;

use crate::utils::error::{Result, RoleError};

/// Failure talking to the user store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached
    #[error("connection failed: {0}")]
    Connection(String),
    /// The store was reached but the lookup failed
    #[error("query failed: {0}")]
    Query(String),
}

/// Narrow lookup interface onto the persistent user store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Raw stored role for a user, or `None` when there is no record
    async fn lookup_role(&self, user_id: &str) -> std::result::Result<Option<String>, StoreError>;
}

#[derive(Debug, Deserialize)]
struct UserRoleFile {
    users: HashMap<String, String>,
}

/// DashMap-backed user store for embedding, fixtures and the CLI
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    roles: DashMap<String, String>,
    lookups: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML document of the form `users: { <id>: <role> }`.
    ///
    /// Role strings are kept verbatim; validation happens on lookup.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: UserRoleFile = serde_yaml::from_str(content)
            .map_err(|e| RoleError::config(format!("Failed to parse user file: {}", e)))?;

        let store = Self::new();
        for (user_id, role) in file.users {
            store.set_role(user_id, role);
        }
        debug!(users = store.len(), "loaded in-memory user store");
        Ok(store)
    }

    /// Record a raw role string for a user
    pub fn set_role(&self, user_id: impl Into<String>, role: impl Into<String>) {
        self.roles.insert(user_id.into(), role.into());
    }

    pub fn remove(&self, user_id: &str) -> Option<String> {
        self.roles.remove(user_id).map(|(_, role)| role)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// How many lookups the store has served
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn lookup_role(&self, user_id: &str) -> std::result::Result<Option<String>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.roles.get(user_id).map(|role| role.clone()))
    }
}
