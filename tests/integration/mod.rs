//! Integration tests for unified-roles
//!
//! These tests verify the interaction between resolution, caching,
//! evaluation and auditing through the public API.

pub mod config_tests;
pub mod service_tests;
