//! Authorization system
//!
//! Everything here assumes an already-authenticated user id.

pub mod audit;
pub mod rbac;
pub mod store;

pub use store::{InMemoryUserStore, StoreError, UserStore};
