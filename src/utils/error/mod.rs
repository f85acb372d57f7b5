//! Error handling for the role engine
//!
//! This module defines the error taxonomy surfaced by role resolution and
//! permission evaluation, plus the ambient configuration/internal errors.

mod conversions;
mod helpers;
mod types;

pub use types::{ErrorKind, Result, RoleError};
