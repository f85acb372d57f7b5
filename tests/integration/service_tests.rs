//! Service integration tests
//!
//! Drive `UnifiedRoleService` end to end: store lookups, the TTL cache,
//! single-flight coalescing, evaluation and the audit trail.

#[cfg(test)]
mod tests {
    use crate::common::TestHarness;
    use crate::{assert_err, assert_ok};
    use std::time::Duration;
    use unified_roles::{AuditOutcome, AuditQuery, ErrorKind, Grant, Role};

    fn storefront() -> TestHarness {
        TestHarness::with_users(&[
            ("cust", "customer"),
            ("stock", "inventory_staff"),
            ("promo", "marketing_staff"),
            ("exec", "executive"),
            ("root", "admin"),
        ])
    }

    // ==================== Permission decisions ====================

    #[tokio::test]
    async fn test_permission_matrix() {
        let h = storefront();
        let cases = [
            ("cust", "orders:view", true),
            ("cust", "orders:create", true),
            ("cust", "inventory:manage", false),
            ("cust", "analytics:view", false),
            ("stock", "inventory:manage", true),
            ("stock", "orders:fulfill", true),
            ("stock", "promotions:manage", false),
            ("promo", "promotions:manage", true),
            ("promo", "inventory:manage", false),
            ("exec", "reports:view", true),
            ("exec", "analytics:export", true),
            ("exec", "inventory:manage", false),
            ("root", "settings:edit", true),
            ("root", "inventory:manage", true),
        ];

        for (user, permission, expected) in cases {
            let allowed = assert_ok!(h.service.has_permission(user, permission).await);
            assert_eq!(allowed, expected, "{user} {permission}");
        }
        assert_eq!(h.audit.len(), cases.len());
    }

    #[tokio::test]
    async fn test_admin_is_granted_unlisted_permissions() {
        let h = storefront();

        assert!(assert_ok!(
            h.service.has_permission("root", "anything:whatever").await
        ));
        let err = assert_err!(h.service.has_permission("cust", "anything:whatever").await);
        assert_eq!(err.kind(), ErrorKind::InvalidPermission);

        let events = h.audit.events();
        assert!(events[0].is_admin_override());
        assert!(events[1].is_error());
    }

    #[tokio::test]
    async fn test_minimum_role_follows_levels() {
        let h = storefront();

        assert!(assert_ok!(h.service.has_minimum_role("exec", Role::InventoryStaff).await));
        assert!(assert_ok!(h.service.has_minimum_role("stock", Role::MarketingStaff).await));
        assert!(!assert_ok!(h.service.has_minimum_role("cust", Role::Executive).await));
        assert!(!assert_ok!(h.service.has_minimum_role("exec", Role::Admin).await));
        assert!(assert_ok!(h.service.has_minimum_role("root", Role::Admin).await));
    }

    // ==================== Failures ====================

    #[tokio::test]
    async fn test_failures_never_grant() {
        let h = TestHarness::with_users(&[("legacy", "manager"), ("blank", "")]);

        let err = assert_err!(h.service.has_permission("legacy", "orders:view").await);
        assert_eq!(err.kind(), ErrorKind::UnknownRole);

        let err = assert_err!(h.service.has_permission("blank", "orders:view").await);
        assert_eq!(err.kind(), ErrorKind::UnknownRole);

        let err = assert_err!(h.service.has_permission("nobody", "orders:view").await);
        assert_eq!(err.kind(), ErrorKind::RoleNotFound);

        let err = assert_err!(h.service.has_minimum_role("legacy", Role::Customer).await);
        assert_eq!(err.kind(), ErrorKind::UnknownRole);

        let events = h.audit.events();
        assert_eq!(events.len(), 4);
        assert!(events.iter().all(|e| e.is_error() && e.role.is_none()));
    }

    #[tokio::test]
    async fn test_store_outage_then_recovery() {
        let h = storefront();
        h.store.set_failing(true);

        let err = assert_err!(h.service.get_role("cust").await);
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(err.is_retryable());

        h.store.set_failing(false);
        assert_eq!(assert_ok!(h.service.get_role("cust").await), Role::Customer);
        assert_eq!(h.store.lookups(), 2);
    }

    // ==================== Caching ====================

    #[tokio::test]
    async fn test_cache_serves_repeat_checks() {
        let h = storefront();

        for _ in 0..10 {
            assert!(assert_ok!(h.service.has_permission("cust", "orders:view").await));
        }
        assert_eq!(h.store.lookups(), 1);

        let stats = h.service.cache_stats();
        assert_eq!(stats.store_fetches, 1);
        assert_eq!(stats.hits, 9);
        assert!(stats.hit_rate() > 0.8);
    }

    #[tokio::test]
    async fn test_ttl_bounds_staleness() {
        let h = storefront();

        assert_eq!(assert_ok!(h.service.get_role("cust").await), Role::Customer);
        h.store.set_role("cust", "executive");

        h.clock.advance(Duration::from_secs(120));
        assert_eq!(assert_ok!(h.service.get_role("cust").await), Role::Customer);

        h.clock.advance(Duration::from_secs(180));
        assert_eq!(assert_ok!(h.service.get_role("cust").await), Role::Executive);
        assert_eq!(h.store.lookups(), 2);
    }

    #[tokio::test]
    async fn test_role_change_with_invalidation() {
        let h = storefront();

        assert!(!assert_ok!(h.service.has_permission("cust", "reports:view").await));

        h.store.set_role("cust", "executive");
        h.service.invalidate("cust");

        assert!(assert_ok!(h.service.has_permission("cust", "reports:view").await));
        assert_eq!(h.store.lookups(), 2);

        let changed: Vec<_> = h
            .audit
            .events_for("cust")
            .into_iter()
            .filter(|e| e.query == AuditQuery::RoleChanged)
            .collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].outcome, AuditOutcome::Invalidated);
    }

    // ==================== Concurrency ====================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cold_misses_coalesce() {
        let h = storefront();
        h.store.set_delay(Duration::from_millis(100));

        let mut handles = Vec::new();
        for i in 0..50 {
            let service = h.service.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    service.has_permission("stock", "inventory:manage").await
                } else {
                    service.has_permission("stock", "promotions:manage").await
                }
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            if assert_ok!(handle.await.unwrap()) {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 25);
        assert_eq!(h.store.lookups(), 1);
        assert_eq!(h.audit.len(), 50);
    }

    #[tokio::test]
    async fn test_abandoned_lookup_still_populates_cache() {
        let h = storefront();
        h.store.set_delay(Duration::from_millis(50));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(5), h.service.get_role("promo")).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(
            assert_ok!(h.service.get_role("promo").await),
            Role::MarketingStaff
        );
        assert_eq!(h.store.lookups(), 1);
    }

    #[tokio::test]
    async fn test_invalidation_during_lookup_forces_refetch() {
        let h = storefront();
        h.store.set_delay(Duration::from_millis(50));

        let service = h.service.clone();
        let first = tokio::spawn(async move { service.get_role("cust").await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        h.store.set_role("cust", "inventory_staff");
        h.service.invalidate("cust");
        assert_ok!(first.await.unwrap());

        assert_eq!(
            assert_ok!(h.service.get_role("cust").await),
            Role::InventoryStaff
        );
        assert_eq!(h.store.lookups(), 2);
    }

    // ==================== Audit trail ====================

    #[tokio::test]
    async fn test_every_call_is_audited_once() {
        let h = storefront();

        let _ = h.service.get_role("cust").await;
        let _ = h.service.get_role("nobody").await;
        let _ = h.service.has_permission("cust", "orders:view").await;
        let _ = h.service.has_permission("cust", "not a permission").await;
        let _ = h
            .service
            .has_any_permission("exec", &["inventory:manage", "reports:view"])
            .await;
        let _ = h.service.has_minimum_role("stock", Role::Customer).await;
        h.service.invalidate("cust");

        let events = h.audit.events();
        assert_eq!(events.len(), 7);
        assert_eq!(events[0].outcome, AuditOutcome::Resolved);
        assert_eq!(
            events[1].outcome,
            AuditOutcome::Error {
                kind: ErrorKind::RoleNotFound
            }
        );
        assert_eq!(
            events[4].outcome,
            AuditOutcome::Granted {
                grant: Grant::Catalog
            }
        );
        assert_eq!(
            events[5].outcome,
            AuditOutcome::Granted {
                grant: Grant::Hierarchy
            }
        );
        assert!(events.iter().all(|e| e.context == "app"));
    }

    #[tokio::test]
    async fn test_feature_scopes_tag_events() {
        let h = storefront();

        let inventory = h.service.scoped("inventory");
        let marketing = h.service.scoped("marketing");
        assert!(assert_ok!(inventory.has_permission("stock", "inventory:manage").await));
        assert!(!assert_ok!(marketing.has_permission("stock", "promotions:manage").await));

        let events = h.audit.events();
        assert_eq!(events[0].context, "inventory");
        assert_eq!(events[1].context, "marketing");
        assert_eq!(events[1].role, Some(Role::InventoryStaff));
    }
}
