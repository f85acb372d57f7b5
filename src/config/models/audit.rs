//! Audit sink configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Which audit sink the engine writes to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Structured tracing events on the `audit` target
    #[default]
    Tracing,
    /// In-process append-only log
    Memory,
    /// Bounded queue drained into the tracing sink by a background task
    Channel,
}

/// Audit configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Sink implementation
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Queue capacity for the channel sink
    #[serde(default = "default_audit_buffer_size")]
    pub buffer_size: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sink: AuditSinkKind::default(),
            buffer_size: default_audit_buffer_size(),
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sink == AuditSinkKind::Channel && self.buffer_size == 0 {
            return Err("audit buffer_size must be greater than zero for the channel sink".to_string());
        }
        Ok(())
    }
}
