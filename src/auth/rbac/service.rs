//! Unified role service
//!
//! The facade the rest of the application calls. It composes resolution,
//! evaluation and auditing, and is the only place audit events are emitted:
//! every public call records exactly one event, whether it succeeds or fails.

use crate::auth::audit::{AuditEvent, AuditOutcome, AuditQuery, AuditSink};
use crate::auth::store::UserStore;
use crate::config::RbacConfig;
use crate::core::cache::{CacheStats, Clock, PermissionCache, SystemClock};
use crate::utils::error::{Result, RoleError};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::catalog::RoleCatalog;
use super::evaluator::PermissionEvaluator;
use super::resolver::RoleResolver;
use super::types::{Decision, Grant, Permission, Role};

/// Role and permission service
#[derive(Debug, Clone)]
pub struct UnifiedRoleService {
    resolver: RoleResolver,
    evaluator: PermissionEvaluator,
    audit: Arc<dyn AuditSink>,
    default_context: String,
}

impl UnifiedRoleService {
    /// Assemble a service from already-built parts
    pub fn new(
        resolver: RoleResolver,
        evaluator: PermissionEvaluator,
        audit: Arc<dyn AuditSink>,
        default_context: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            evaluator,
            audit,
            default_context: default_context.into(),
        }
    }

    /// Build a service from configuration on the system clock
    pub fn from_config(
        config: &RbacConfig,
        store: Arc<dyn UserStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self> {
        Self::from_config_with_clock(config, store, audit, Arc::new(SystemClock))
    }

    /// Build a service from configuration with a caller-supplied cache clock
    pub fn from_config_with_clock(
        config: &RbacConfig,
        store: Arc<dyn UserStore>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| RoleError::config(format!("RBAC config error: {}", e)))?;

        let catalog = Arc::new(RoleCatalog::from_config(&config.catalog)?);
        let cache = PermissionCache::with_clock(config.cache_ttl(), clock);
        let resolver = RoleResolver::new(
            Arc::clone(&catalog),
            store,
            cache,
            config.store_timeout(),
        );
        let evaluator = PermissionEvaluator::new(catalog);

        info!(
            cache_ttl_secs = config.cache_ttl_secs,
            store_timeout_ms = config.store_timeout_ms,
            "Unified role service initialized"
        );
        Ok(Self::new(
            resolver,
            evaluator,
            audit,
            config.default_context.clone(),
        ))
    }

    pub fn catalog(&self) -> &RoleCatalog {
        self.evaluator.catalog()
    }

    pub fn resolver(&self) -> &RoleResolver {
        &self.resolver
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.resolver.cache().stats()
    }

    /// Scope checks to a feature area recorded in every audit event
    pub fn scoped(&self, area: impl Into<String>) -> FeatureScope<'_> {
        FeatureScope {
            service: self,
            context: area.into(),
        }
    }

    /// Resolve a user's role
    pub async fn get_role(&self, user_id: &str) -> Result<Role> {
        self.get_role_in(&self.default_context, user_id).await
    }

    /// Whether a user holds a permission.
    ///
    /// `Ok(false)` is an explicit deny. `Err` means access could not be
    /// determined and must not be treated as either answer by default.
    pub async fn has_permission(&self, user_id: &str, permission: &str) -> Result<bool> {
        self.has_permission_in(&self.default_context, user_id, permission)
            .await
    }

    /// Whether a user holds at least one of several permissions
    pub async fn has_any_permission(&self, user_id: &str, permissions: &[&str]) -> Result<bool> {
        self.has_any_permission_in(&self.default_context, user_id, permissions)
            .await
    }

    /// Whether a user's role sits at or above `required` in the hierarchy
    pub async fn has_minimum_role(&self, user_id: &str, required: Role) -> Result<bool> {
        self.has_minimum_role_in(&self.default_context, user_id, required)
            .await
    }

    /// Called after a user's stored role changes
    pub fn invalidate(&self, user_id: &str) {
        self.invalidate_in(&self.default_context, user_id)
    }

    async fn get_role_in(&self, context: &str, user_id: &str) -> Result<Role> {
        let result = self.resolver.resolve(user_id).await.map(|r| r.role);

        let outcome = match &result {
            Ok(_) => AuditOutcome::Resolved,
            Err(e) => AuditOutcome::from(e),
        };
        self.emit(
            context,
            user_id,
            AuditQuery::GetRole,
            outcome,
            result.as_ref().ok().copied(),
        );
        result
    }

    async fn has_permission_in(
        &self,
        context: &str,
        user_id: &str,
        permission: &str,
    ) -> Result<bool> {
        let (role, decision) = self.decide(user_id, &[permission]).await;

        self.emit(
            context,
            user_id,
            AuditQuery::Permission {
                permission: permission.to_string(),
            },
            decision_outcome(&decision),
            role,
        );
        decision.map(|d| d.is_allowed())
    }

    async fn has_any_permission_in(
        &self,
        context: &str,
        user_id: &str,
        permissions: &[&str],
    ) -> Result<bool> {
        let (role, decision) = self.decide(user_id, permissions).await;

        self.emit(
            context,
            user_id,
            AuditQuery::AnyPermission {
                permissions: permissions.iter().map(|p| p.to_string()).collect(),
            },
            decision_outcome(&decision),
            role,
        );
        decision.map(|d| d.is_allowed())
    }

    async fn has_minimum_role_in(
        &self,
        context: &str,
        user_id: &str,
        required: Role,
    ) -> Result<bool> {
        let result = self.resolver.resolve(user_id).await.map(|r| r.role);

        let (outcome, role, allowed) = match &result {
            Ok(role) => {
                let meets = self.evaluator.meets_minimum_role(*role, required);
                let outcome = if meets {
                    AuditOutcome::Granted {
                        grant: Grant::Hierarchy,
                    }
                } else {
                    AuditOutcome::Denied
                };
                (outcome, Some(*role), Ok(meets))
            }
            Err(e) => (AuditOutcome::from(e), None, Err(e.clone())),
        };

        self.emit(
            context,
            user_id,
            AuditQuery::MinimumRole { required },
            outcome,
            role,
        );
        allowed
    }

    fn invalidate_in(&self, context: &str, user_id: &str) {
        let had_entry = self.resolver.invalidate(user_id);
        debug!(user_id, had_entry, "role change invalidated cached role");

        self.emit(
            context,
            user_id,
            AuditQuery::RoleChanged,
            AuditOutcome::Invalidated,
            None,
        );
    }

    /// Parse, resolve, then evaluate; the first allow wins.
    ///
    /// Permission strings are shape-checked before any store round-trip.
    async fn decide(&self, user_id: &str, requested: &[&str]) -> (Option<Role>, Result<Decision>) {
        if requested.is_empty() {
            return (
                None,
                Err(RoleError::invalid_permission("", "no permissions supplied")),
            );
        }

        let parsed = match requested
            .iter()
            .map(|p| Permission::parse(p))
            .collect::<Result<Vec<_>>>()
        {
            Ok(parsed) => parsed,
            Err(e) => return (None, Err(e)),
        };

        let role = match self.resolver.resolve(user_id).await {
            Ok(resolution) => resolution.role,
            Err(e) => return (None, Err(e)),
        };

        // Every permission is checked against the catalog, so a typo fails
        // the call even when another entry would have granted access.
        let mut decision = Decision::Deny;
        for permission in &parsed {
            match self.evaluator.evaluate(role, permission) {
                Ok(Decision::Allow(grant)) if decision == Decision::Deny => {
                    decision = Decision::Allow(grant);
                }
                Ok(_) => {}
                Err(e) => return (Some(role), Err(e)),
            }
        }
        (Some(role), Ok(decision))
    }

    fn emit(
        &self,
        context: &str,
        user_id: &str,
        query: AuditQuery,
        outcome: AuditOutcome,
        role: Option<Role>,
    ) {
        if let AuditOutcome::Error { kind } = outcome {
            error!(user_id, query = query.label(), error_kind = %kind, context, "role check failed");
        }

        let event = AuditEvent::new(user_id, query, outcome, context).with_role(role);
        self.audit.record(event);
    }
}

fn decision_outcome(decision: &Result<Decision>) -> AuditOutcome {
    match decision {
        Ok(Decision::Allow(grant)) => AuditOutcome::Granted { grant: *grant },
        Ok(Decision::Deny) => AuditOutcome::Denied,
        Err(e) => AuditOutcome::from(e),
    }
}

/// The service's operations, tagged with a feature area
#[derive(Debug, Clone)]
pub struct FeatureScope<'a> {
    service: &'a UnifiedRoleService,
    context: String,
}

impl FeatureScope<'_> {
    pub fn context(&self) -> &str {
        &self.context
    }

    pub async fn get_role(&self, user_id: &str) -> Result<Role> {
        self.service.get_role_in(&self.context, user_id).await
    }

    pub async fn has_permission(&self, user_id: &str, permission: &str) -> Result<bool> {
        self.service
            .has_permission_in(&self.context, user_id, permission)
            .await
    }

    pub async fn has_any_permission(&self, user_id: &str, permissions: &[&str]) -> Result<bool> {
        self.service
            .has_any_permission_in(&self.context, user_id, permissions)
            .await
    }

    pub async fn has_minimum_role(&self, user_id: &str, required: Role) -> Result<bool> {
        self.service
            .has_minimum_role_in(&self.context, user_id, required)
            .await
    }

    pub fn invalidate(&self, user_id: &str) {
        self.service.invalidate_in(&self.context, user_id)
    }
}
