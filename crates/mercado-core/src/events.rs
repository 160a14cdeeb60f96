//! # Domain Events
//!
//! Facts about completed state changes. Lifecycle operations *return* these;
//! delivery is decided by the caller after the change is persisted.
//!
//! ```text
//! Sale::create ──────► SaleCreated
//! Sale::revise ──────► SaleModified (+ SaleCanceled when status → canceled)
//! Sale::cancel ──────► SaleCanceled
//! Sale::complete ────► SaleModified
//! SaleItem::cancel ──► SaleItemCanceled
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCreated {
    pub sale_id: Uuid,
    pub sale_number: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleModified {
    pub sale_id: Uuid,
    pub sale_number: String,
    pub modified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCanceled {
    pub sale_id: Uuid,
    pub sale_number: String,
    pub canceled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemCanceled {
    pub item_id: Uuid,
    pub sale_id: Uuid,
    pub canceled_at: DateTime<Utc>,
}

/// Every event the sales domain emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SaleEvent {
    SaleCreated(SaleCreated),
    SaleModified(SaleModified),
    SaleCanceled(SaleCanceled),
    SaleItemCanceled(SaleItemCanceled),
}

impl SaleEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            SaleEvent::SaleCreated(_) => "SaleCreated",
            SaleEvent::SaleModified(_) => "SaleModified",
            SaleEvent::SaleCanceled(_) => "SaleCanceled",
            SaleEvent::SaleItemCanceled(_) => "SaleItemCanceled",
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SaleEvent::SaleCreated(e) => e.created_at,
            SaleEvent::SaleModified(e) => e.modified_at,
            SaleEvent::SaleCanceled(e) => e.canceled_at,
            SaleEvent::SaleItemCanceled(e) => e.canceled_at,
        }
    }

    /// Id of the sale the event belongs to.
    pub fn aggregate_id(&self) -> Uuid {
        match self {
            SaleEvent::SaleCreated(e) => e.sale_id,
            SaleEvent::SaleModified(e) => e.sale_id,
            SaleEvent::SaleCanceled(e) => e.sale_id,
            SaleEvent::SaleItemCanceled(e) => e.sale_id,
        }
    }
}

impl From<SaleCreated> for SaleEvent {
    fn from(e: SaleCreated) -> Self {
        SaleEvent::SaleCreated(e)
    }
}

impl From<SaleModified> for SaleEvent {
    fn from(e: SaleModified) -> Self {
        SaleEvent::SaleModified(e)
    }
}

impl From<SaleCanceled> for SaleEvent {
    fn from(e: SaleCanceled) -> Self {
        SaleEvent::SaleCanceled(e)
    }
}

impl From<SaleItemCanceled> for SaleEvent {
    fn from(e: SaleItemCanceled) -> Self {
        SaleEvent::SaleItemCanceled(e)
    }
}
