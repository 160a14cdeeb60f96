//! # Event Publishing
//!
//! Handlers hand their [`SaleEvent`]s to an [`EventPublisher`] after the
//! state change is persisted. Delivery is fire-and-forget: a failed publish
//! is logged and the command still succeeds.
//!
//! ```text
//! handler ──► publish_all(&dyn EventPublisher, events)
//!                 │
//!                 ├── LoggingPublisher  → "[EVENT] Sale Created: 1001 at ..."
//!                 ├── OutboxPublisher   → event_outbox row (JSON payload)
//!                 └── FanoutPublisher   → each of the above, in order
//!
//! relay_outbox(outbox, downstream, batch)
//!     pending(batch) ──► decode ──► downstream.publish ──► mark_published
//!                                        │
//!                                        └── failure: stop, entry stays pending
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use mercado_core::SaleEvent;
use mercado_db::{DbError, EventOutboxRepository};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Outbox write failed: {0}")]
    Outbox(#[from] DbError),

    #[error("Publisher rejected {event_type}: {reason}")]
    Rejected { event_type: String, reason: String },
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &SaleEvent) -> Result<(), PublishError>;
}

/// Publishes every event, logging failures instead of returning them.
pub async fn publish_all(publisher: &dyn EventPublisher, events: &[SaleEvent]) {
    for event in events {
        if let Err(e) = publisher.publish(event).await {
            warn!(
                event_type = event.event_type(),
                aggregate_id = %event.aggregate_id(),
                error = %e,
                "Failed to publish event"
            );
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Writes one `[EVENT]` line per event through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct LoggingPublisher;

impl LoggingPublisher {
    pub fn describe(event: &SaleEvent) -> String {
        match event {
            SaleEvent::SaleCreated(e) => {
                format!("[EVENT] Sale Created: {} at {}", e.sale_number, e.created_at)
            }
            SaleEvent::SaleModified(e) => {
                format!("[EVENT] Sale Modified: {} at {}", e.sale_number, e.modified_at)
            }
            SaleEvent::SaleCanceled(e) => {
                format!("[EVENT] Sale Canceled: {} at {}", e.sale_number, e.canceled_at)
            }
            SaleEvent::SaleItemCanceled(e) => format!(
                "[EVENT] Sale Item Canceled: {} from sale {} at {}",
                e.item_id, e.sale_id, e.canceled_at
            ),
        }
    }
}

#[async_trait]
impl EventPublisher for LoggingPublisher {
    async fn publish(&self, event: &SaleEvent) -> Result<(), PublishError> {
        info!(target: "mercado::events", "{}", Self::describe(event));
        Ok(())
    }
}

// =============================================================================
// Outbox
// =============================================================================

/// Appends events to the `event_outbox` table for a downstream relay.
#[derive(Debug, Clone)]
pub struct OutboxPublisher {
    outbox: EventOutboxRepository,
}

impl OutboxPublisher {
    pub fn new(outbox: EventOutboxRepository) -> Self {
        OutboxPublisher { outbox }
    }
}

#[async_trait]
impl EventPublisher for OutboxPublisher {
    async fn publish(&self, event: &SaleEvent) -> Result<(), PublishError> {
        let entry = self.outbox.append(event).await?;
        debug!(id = %entry.id, event_type = %entry.event_type, "Event queued in outbox");
        Ok(())
    }
}

// =============================================================================
// Fan-out
// =============================================================================

/// Delivers to every inner publisher. The first failure is returned after
/// all of them have been tried.
#[derive(Clone, Default)]
pub struct FanoutPublisher {
    publishers: Vec<Arc<dyn EventPublisher>>,
}

impl FanoutPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publishers.push(publisher);
        self
    }

    pub fn len(&self) -> usize {
        self.publishers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.publishers.is_empty()
    }
}

#[async_trait]
impl EventPublisher for FanoutPublisher {
    async fn publish(&self, event: &SaleEvent) -> Result<(), PublishError> {
        let mut first_error = None;
        for publisher in &self.publishers {
            if let Err(e) = publisher.publish(event).await {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Relay
// =============================================================================

/// Delivers up to `batch` pending outbox entries, oldest first.
///
/// Stops at the first delivery failure so entries keep their order; the
/// failed entry and everything after it stay pending. Returns how many
/// entries were delivered.
pub async fn relay_outbox(
    outbox: &EventOutboxRepository,
    downstream: &dyn EventPublisher,
    batch: u32,
) -> Result<usize, PublishError> {
    let entries = outbox.pending(batch).await?;
    let mut delivered = 0;

    for entry in &entries {
        let event = entry.event()?;
        if let Err(e) = downstream.publish(&event).await {
            warn!(id = %entry.id, event_type = %entry.event_type, error = %e, "Outbox relay stopped");
            break;
        }
        outbox.mark_published(entry.id).await?;
        delivered += 1;
    }

    if delivered > 0 {
        debug!(delivered, "Relayed outbox entries");
    }
    Ok(delivered)
}
