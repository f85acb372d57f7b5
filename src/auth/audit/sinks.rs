//! Audit sink implementations

use crate::config::{AuditConfig, AuditSinkKind};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::types::{AuditEvent, AuditOutcome};

/// Append-only recorder of audit events.
///
/// `record` must return promptly and must not fail the caller; sinks that
/// persist somewhere slow should queue.
pub trait AuditSink: Send + Sync + std::fmt::Debug {
    fn record(&self, event: AuditEvent);
}

/// Emits every event as a structured tracing event on the `audit` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        let role = event.role.map(|r| r.as_str()).unwrap_or("");
        let query = serde_json::to_string(&event.query).unwrap_or_default();

        match event.outcome {
            AuditOutcome::Granted { grant } => info!(
                target: "audit",
                event = event.query.label(),
                event_id = %event.id,
                user_id = %event.user_id,
                query = %query,
                outcome = event.outcome.label(),
                grant = ?grant,
                role = role,
                context = %event.context,
                "access granted"
            ),
            AuditOutcome::Denied => warn!(
                target: "audit",
                event = event.query.label(),
                event_id = %event.id,
                user_id = %event.user_id,
                query = %query,
                outcome = event.outcome.label(),
                role = role,
                context = %event.context,
                "access denied"
            ),
            AuditOutcome::Error { kind } => warn!(
                target: "audit",
                event = event.query.label(),
                event_id = %event.id,
                user_id = %event.user_id,
                query = %query,
                outcome = event.outcome.label(),
                error_kind = %kind,
                context = %event.context,
                "access undetermined"
            ),
            AuditOutcome::Resolved | AuditOutcome::Invalidated => info!(
                target: "audit",
                event = event.query.label(),
                event_id = %event.id,
                user_id = %event.user_id,
                outcome = event.outcome.label(),
                role = role,
                context = %event.context,
                "role event"
            ),
        }
    }
}

/// In-process append-only event log
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event recorded so far, oldest first
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    pub fn events_for(&self, user_id: &str) -> Vec<AuditEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.write().push(event);
    }
}

/// Bounded queue in front of another sink.
///
/// A background task drains the queue into the downstream sink. When the
/// queue is full the event is dropped and counted; decisions never wait.
/// Must be constructed inside a Tokio runtime.
#[derive(Debug)]
pub struct ChannelAuditSink {
    sender: mpsc::Sender<AuditEvent>,
    dropped: AtomicU64,
}

impl ChannelAuditSink {
    pub fn new(buffer_size: usize, downstream: Arc<dyn AuditSink>) -> Self {
        let (sender, mut receiver) = mpsc::channel::<AuditEvent>(buffer_size.max(1));

        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                downstream.record(event);
            }
        });

        Self {
            sender,
            dropped: AtomicU64::new(0),
        }
    }

    /// Events dropped because the queue was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl AuditSink for ChannelAuditSink {
    fn record(&self, event: AuditEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(event_id = %event.id, user_id = %event.user_id, "audit queue full, event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                error!(event_id = %event.id, "audit queue closed, event dropped");
            }
        }
    }
}

/// Build the sink selected in configuration
pub fn build_sink(config: &AuditConfig) -> Arc<dyn AuditSink> {
    match config.sink {
        AuditSinkKind::Tracing => Arc::new(TracingAuditSink),
        AuditSinkKind::Memory => Arc::new(MemoryAuditSink::new()),
        AuditSinkKind::Channel => Arc::new(ChannelAuditSink::new(
            config.buffer_size,
            Arc::new(TracingAuditSink),
        )),
    }
}
