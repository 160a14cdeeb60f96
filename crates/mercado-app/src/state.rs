//! # Application State
//!
//! Everything a handler needs, shared behind `Arc`s. Handlers only see the
//! repository traits, so tests can swap in any implementation.
//!
//! ```text
//! AppState
//! ├── sales:      Arc<dyn SaleRepository>
//! ├── sale_items: Arc<dyn SaleItemRepository>
//! ├── policy:     SalesPolicy (validation config)
//! └── publisher:  Arc<dyn EventPublisher>
//! ```

use std::sync::Arc;

use mercado_core::SalesPolicy;
use mercado_db::{Database, SaleItemRepository, SaleRepository};
use tracing::info;

use crate::config::AppConfig;
use crate::publisher::{EventPublisher, FanoutPublisher, LoggingPublisher, OutboxPublisher};

#[derive(Clone)]
pub struct AppState {
    pub sales: Arc<dyn SaleRepository>,
    pub sale_items: Arc<dyn SaleItemRepository>,
    pub policy: SalesPolicy,
    pub publisher: Arc<dyn EventPublisher>,
}

impl AppState {
    pub fn new(
        sales: Arc<dyn SaleRepository>,
        sale_items: Arc<dyn SaleItemRepository>,
        policy: SalesPolicy,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        AppState {
            sales,
            sale_items,
            policy,
            publisher,
        }
    }

    /// Wires the SQLite repositories and the configured publishers.
    pub fn from_database(db: &Database, config: &AppConfig) -> Self {
        let mut publisher = FanoutPublisher::new().with(Arc::new(LoggingPublisher));
        if config.outbox_enabled {
            publisher = publisher.with(Arc::new(OutboxPublisher::new(db.event_outbox())));
        }
        info!(
            outbox = config.outbox_enabled,
            max_page_size = config.max_page_size,
            "Application state ready"
        );

        AppState::new(
            Arc::new(db.sales()),
            Arc::new(db.sale_items()),
            SalesPolicy::new(config.validation_config()),
            Arc::new(publisher),
        )
    }
}
