//! Utility modules for the role engine
//!
//! - **error**: Error taxonomy and result alias
//! - **logging**: Tracing subscriber setup

pub mod error; // Error handling
pub mod logging; // Logging & monitoring

pub use error::{ErrorKind, Result, RoleError};
pub use logging::init_tracing;
