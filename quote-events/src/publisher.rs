//! Fire-and-forget event publisher
//!
//! Quote handlers call [`Publisher::emit`], which never fails: sink errors
//! are logged and counted, and the already-computed quote is unaffected.

use crate::{envelope::CloudEvent, metrics::EVENT_PUBLISH_TOTAL, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Destination for published events
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event
    async fn send(&self, event: &CloudEvent) -> Result<()>;

    /// Sink name for logs and metrics
    fn name(&self) -> &'static str;
}

/// Writes events to the structured log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    async fn send(&self, event: &CloudEvent) -> Result<()> {
        let body = serde_json::to_string(event)?;
        info!(
            event_id = %event.id,
            event_type = %event.event_type,
            subject = event.subject.as_deref().unwrap_or_default(),
            event = %body,
            "Quote event"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<CloudEvent>>,
}

impl MemorySink {
    /// Create empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far
    pub fn events(&self) -> Vec<CloudEvent> {
        self.events.lock().clone()
    }

    /// Number of events received
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events were received
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn send(&self, event: &CloudEvent) -> Result<()> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Event publisher
#[derive(Clone)]
pub struct Publisher {
    sink: Arc<dyn EventSink>,
    enabled: bool,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("sink", &self.sink.name())
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl Publisher {
    /// Create new publisher
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink, enabled: true }
    }

    /// Publisher that drops every event
    pub fn disabled() -> Self {
        Self {
            sink: Arc::new(LogSink),
            enabled: false,
        }
    }

    /// Whether events are delivered
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Publish an event, returning the sink's result
    pub async fn publish(&self, event: &CloudEvent) -> Result<()> {
        if !self.enabled {
            debug!("Event publishing disabled, dropping {}", event.id);
            return Ok(());
        }

        let event_type = event.kind().map(|kind| kind.label()).unwrap_or("unknown");
        let result = self.sink.send(event).await;

        let status = if result.is_ok() { "success" } else { "error" };
        EVENT_PUBLISH_TOTAL
            .with_label_values(&[event_type, self.sink.name(), status])
            .inc();

        result
    }

    /// Publish an event, logging and discarding any failure
    pub async fn emit(&self, event: &CloudEvent) {
        if let Err(e) = self.publish(event).await {
            warn!(
                event_id = %event.id,
                sink = self.sink.name(),
                "Failed to emit quote event: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventType;
    use crate::Error;
    use serde_json::json;

    struct FailingSink;

    #[async_trait]
    impl EventSink for FailingSink {
        async fn send(&self, _event: &CloudEvent) -> Result<()> {
            Err(Error::Sink("sink unavailable".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn event() -> CloudEvent {
        CloudEvent::new(EventType::BnplQuote, "okra", "trace-1", json!({"score": 0.7}))
    }

    #[tokio::test]
    async fn test_memory_sink_captures() {
        let sink = Arc::new(MemorySink::new());
        let publisher = Publisher::new(sink.clone());

        publisher.publish(&event()).await.unwrap();
        publisher.emit(&event()).await;

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events()[0].event_type, "ocn.okra.bnpl_quote.v1");
    }

    #[tokio::test]
    async fn test_log_sink() {
        let publisher = Publisher::new(Arc::new(LogSink));
        assert!(publisher.publish(&event()).await.is_ok());
    }

    #[tokio::test]
    async fn test_failures_surface_on_publish_only() {
        let publisher = Publisher::new(Arc::new(FailingSink));

        assert!(matches!(publisher.publish(&event()).await, Err(Error::Sink(_))));

        let failures = || {
            EVENT_PUBLISH_TOTAL
                .with_label_values(&["bnpl_quote", "failing", "error"])
                .get()
        };
        let before = failures();
        publisher.emit(&event()).await;
        assert_eq!(failures(), before + 1);
    }

    #[tokio::test]
    async fn test_disabled_publisher_drops() {
        let publisher = Publisher::disabled();

        assert!(!publisher.is_enabled());
        assert!(publisher.publish(&event()).await.is_ok());
    }
}
