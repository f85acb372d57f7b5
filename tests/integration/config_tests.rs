//! Configuration integration tests
//!
//! Load the shipped example configuration and custom catalogs, and check that
//! invalid catalogs are refused at startup rather than at decision time.

#[cfg(test)]
mod tests {
    use crate::common::{CountingStore, TestHarness};
    use crate::{assert_err, assert_ok};
    use std::sync::Arc;
    use unified_roles::{
        CatalogConfig, Config, MemoryAuditSink, RbacConfig, Role, RoleCatalog, RoleError,
        UnifiedRoleService,
    };

    const EXAMPLE: &str = include_str!("../../config/roles.example.yaml");

    // ==================== Shipped configuration ====================

    #[test]
    fn test_example_config_matches_defaults() {
        let config = assert_ok!(Config::from_yaml(EXAMPLE));
        assert_eq!(config.rbac.catalog, CatalogConfig::default());
        assert_eq!(config.rbac.cache_ttl_secs, 300);
        assert_eq!(config.rbac.store_timeout_ms, 3000);
    }

    #[test]
    fn test_default_catalog_shape() {
        let catalog = assert_ok!(RoleCatalog::from_config(&CatalogConfig::default()));

        let roles = catalog.roles();
        assert_eq!(roles.first().map(|(role, _)| *role), Some(Role::Customer));
        assert_eq!(roles.last().map(|(role, _)| *role), Some(Role::Admin));
        assert_eq!(
            catalog.level(Role::InventoryStaff),
            catalog.level(Role::MarketingStaff)
        );

        let customer = catalog.permissions_for(Role::Customer);
        for role in [Role::InventoryStaff, Role::MarketingStaff, Role::Executive] {
            assert!(customer.is_subset(catalog.permissions_for(role)), "{role}");
        }
    }

    // ==================== Custom catalogs ====================

    #[tokio::test]
    async fn test_custom_catalog_drives_decisions() {
        let yaml = r#"
cache_ttl_secs: 30
default_context: backoffice
catalog:
  roles:
    - role: customer
      level: 1
      permissions: ["orders:view"]
    - role: executive
      level: 5
      permissions: ["orders:view", "reports:view"]
      superset_of: [customer]
    - role: admin
      level: 10
"#;
        let config = assert_ok!(Config::from_yaml(yaml));
        let h = TestHarness::with_config(&[("c", "customer"), ("s", "inventory_staff")], config.rbac);

        assert!(assert_ok!(h.service.has_permission("c", "orders:view").await));
        assert!(!assert_ok!(h.service.has_permission("c", "reports:view").await));

        // Parses as a role, but this catalog does not define it
        let err = assert_err!(h.service.get_role("s").await);
        assert!(matches!(err, RoleError::UnknownRole { .. }));

        assert!(h.audit.events().iter().all(|e| e.context == "backoffice"));
    }

    #[test]
    fn test_superset_violation_rejected() {
        let yaml = r#"
catalog:
  roles:
    - role: customer
      level: 1
      permissions: ["orders:view", "profile:edit"]
    - role: executive
      level: 5
      permissions: ["orders:view"]
      superset_of: [customer]
"#;
        let err = assert_err!(Config::from_yaml(yaml));
        assert!(err.to_string().contains("profile:edit"));
    }

    #[test]
    fn test_duplicate_role_rejected() {
        let yaml = r#"
catalog:
  roles:
    - role: customer
      level: 1
    - role: customer
      level: 2
"#;
        assert!(matches!(
            assert_err!(Config::from_yaml(yaml)),
            RoleError::Config(_)
        ));
    }

    #[test]
    fn test_service_refuses_invalid_config() {
        let config = RbacConfig {
            store_timeout_ms: 0,
            ..RbacConfig::default()
        };

        let result = UnifiedRoleService::from_config(
            &config,
            Arc::new(CountingStore::new(&[])),
            Arc::new(MemoryAuditSink::new()),
        );
        assert!(matches!(result, Err(RoleError::Config(_))));
    }
}
