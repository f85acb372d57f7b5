//! Audit trail for role and permission decisions
//!
//! One [`AuditEvent`] is recorded per public engine call, including failed
//! resolutions, plus one per role change. Sinks are append-only and
//! fire-and-forget: recording never blocks or fails a decision.

mod sinks;
mod types;

pub use sinks::{AuditSink, ChannelAuditSink, MemoryAuditSink, TracingAuditSink, build_sink};
pub use types::{AuditEvent, AuditOutcome, AuditQuery};
