//! Common test utilities for unified-roles
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::common::fixtures::TestHarness;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let harness = TestHarness::with_users(&[("u1", "customer")]);
//!     assert!(harness.service.has_permission("u1", "orders:view").await.unwrap());
//! }
//! ```

pub mod fixtures;

pub use fixtures::{CountingStore, TestHarness};

/// Assert that a result is Ok and return the value
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a result is Err
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
