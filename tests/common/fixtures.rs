//! Test fixtures
//!
//! Store doubles are real implementations of `UserStore`, not mocks, so
//! integration tests exercise the same code paths production callers do.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use unified_roles::{
    ManualClock, MemoryAuditSink, RbacConfig, StoreError, UnifiedRoleService, UserStore,
};

/// User store that counts lookups and can be slowed down or failed
#[derive(Debug, Default)]
pub struct CountingStore {
    roles: DashMap<String, String>,
    lookups: AtomicUsize,
    delay_ms: AtomicUsize,
    failing: AtomicBool,
}

impl CountingStore {
    pub fn new(users: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (id, role) in users {
            store.set_role(id, role);
        }
        store
    }

    pub fn set_role(&self, user_id: &str, role: &str) {
        self.roles.insert(user_id.to_string(), role.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as usize, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserStore for CountingStore {
    async fn lookup_role(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay as u64)).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("connection refused".to_string()));
        }
        Ok(self.roles.get(user_id).map(|role| role.clone()))
    }
}

/// A service wired to a counting store, an in-memory audit log and a manual clock
pub struct TestHarness {
    pub service: UnifiedRoleService,
    pub store: Arc<CountingStore>,
    pub audit: Arc<MemoryAuditSink>,
    pub clock: Arc<ManualClock>,
}

impl TestHarness {
    pub fn with_users(users: &[(&str, &str)]) -> Self {
        Self::with_config(users, RbacConfig::default())
    }

    pub fn with_config(users: &[(&str, &str)], config: RbacConfig) -> Self {
        let store = Arc::new(CountingStore::new(users));
        let audit = Arc::new(MemoryAuditSink::new());
        let clock = Arc::new(ManualClock::new());

        let service = UnifiedRoleService::from_config_with_clock(
            &config,
            store.clone(),
            audit.clone(),
            clock.clone(),
        )
        .expect("default test configuration is valid");

        Self {
            service,
            store,
            audit,
            clock,
        }
    }
}
