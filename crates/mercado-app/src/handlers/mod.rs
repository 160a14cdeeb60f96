//! # Command Handlers
//!
//! One async function per use case. Each is a thin sequence over the
//! domain and the repositories:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Handler Flow                                     │
//! │                                                                         │
//! │  cancel.check()                  ◄── caller already gone? stop          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  state.policy.check_*(&cmd)      ◄── every rule, all failures reported  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load sale / item                ◄── NotFound when absent               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  state.policy.build_* / revise_* ◄── guards + discount, returns events  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cancel.run(repo.create/update)  ◄── persist (abandoned on cancel)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  publish_all(events)             ◄── failures logged, never returned    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleResult / SaleItemResult                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Handler Organization
//! ```text
//! handlers/
//! ├── mod.rs        ◄─── shared loaders
//! ├── sale.rs       ◄─── create/get/update/delete/list/cancel/complete sale
//! └── sale_item.rs  ◄─── create/get/update/delete/cancel sale item
//! ```

pub mod sale;
pub mod sale_item;

use mercado_core::{CoreError, EntityKind, Sale, SaleItem};
use mercado_db::{Include, Repository};
use uuid::Uuid;

use crate::cancel::CancelToken;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub use sale::{cancel_sale, complete_sale, create_sale, delete_sale, get_sale, list_sales, update_sale};
pub use sale_item::{cancel_sale_item, create_sale_item, delete_sale_item, get_sale_item, update_sale_item};

/// Loads a sale or fails with NotFound.
pub(crate) async fn load_sale(
    state: &AppState,
    id: Uuid,
    include: &[Include],
    cancel: &CancelToken,
) -> AppResult<Sale> {
    cancel
        .run(state.sales.get_by_id(id, include))
        .await?
        .ok_or_else(|| AppError::from(CoreError::not_found(EntityKind::Sale, id)))
}

/// Loads a sale item or fails with NotFound.
pub(crate) async fn load_sale_item(state: &AppState, id: Uuid, cancel: &CancelToken) -> AppResult<SaleItem> {
    cancel
        .run(state.sale_items.get_by_id(id, &[]))
        .await?
        .ok_or_else(|| AppError::from(CoreError::not_found(EntityKind::SaleItem, id)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use mercado_core::commands::{CreateSale, SaleItemInput};
    use mercado_core::{SaleEvent, SalesPolicy, ValidationConfig};
    use mercado_db::{Database, DbConfig};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use crate::publisher::{EventPublisher, PublishError};
    use crate::state::AppState;

    /// Keeps every published event for assertions.
    #[derive(Default)]
    pub struct RecordingPublisher {
        events: Mutex<Vec<SaleEvent>>,
    }

    impl RecordingPublisher {
        pub fn types(&self) -> Vec<&'static str> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(SaleEvent::event_type)
                .collect()
        }

        pub fn events(&self) -> Vec<SaleEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn clear(&self) {
            self.events.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, event: &SaleEvent) -> Result<(), PublishError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    pub struct Harness {
        pub db: Database,
        pub state: AppState,
        pub events: Arc<RecordingPublisher>,
    }

    pub async fn harness() -> Harness {
        harness_with(ValidationConfig::default()).await
    }

    pub async fn harness_with(config: ValidationConfig) -> Harness {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let events = Arc::new(RecordingPublisher::default());
        let state = AppState::new(
            Arc::new(db.sales()),
            Arc::new(db.sale_items()),
            SalesPolicy::new(config),
            events.clone(),
        );
        Harness { db, state, events }
    }

    pub fn line(quantity: i64, unit_price: Decimal) -> SaleItemInput {
        SaleItemInput {
            id: None,
            product_id: Uuid::new_v4(),
            quantity,
            unit_price,
            discount: Decimal::ZERO,
        }
    }

    pub fn create_cmd(sale_number: &str, items: Vec<SaleItemInput>) -> CreateSale {
        CreateSale {
            sale_number: sale_number.to_string(),
            sale_date: Utc::now() - Duration::hours(1),
            branch_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            items,
        }
    }
}
