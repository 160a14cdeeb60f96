//! Serializable views returned by the command handlers.
//!
//! `totalAmount` is always computed from the items at mapping time; it is
//! never read back from storage.

use chrono::{DateTime, Utc};
use mercado_core::{Money, Page, Sale, SaleItem, SaleItemStatus, SaleStatus};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemResult {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
    pub unit_price: Money,
    pub discount: Money,
    pub total: Money,
    pub status: SaleItemStatus,
}

impl From<&SaleItem> for SaleItemResult {
    fn from(item: &SaleItem) -> Self {
        SaleItemResult {
            id: item.id(),
            sale_id: item.sale_id(),
            product_id: item.product_id(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            discount: item.discount(),
            total: item.total(),
            status: item.status(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResult {
    pub id: Uuid,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: Uuid,
    pub branch_id: Uuid,
    pub status: SaleStatus,
    pub total_amount: Money,
    pub items: Vec<SaleItemResult>,
}

impl From<&Sale> for SaleResult {
    fn from(sale: &Sale) -> Self {
        SaleResult {
            id: sale.id(),
            sale_number: sale.sale_number().to_string(),
            sale_date: sale.sale_date(),
            customer_id: sale.customer_id(),
            branch_id: sale.branch_id(),
            status: sale.status(),
            total_amount: sale.total(),
            items: sale.items().iter().map(SaleItemResult::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleListResult {
    pub sales: Vec<SaleResult>,
    /// Total sales in the store, not the length of this page.
    pub count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl From<Page<Sale>> for SaleListResult {
    fn from(page: Page<Sale>) -> Self {
        SaleListResult {
            sales: page.items.iter().map(SaleResult::from).collect(),
            count: page.total_count,
            page_number: page.page_number,
            page_size: page.page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub success: bool,
}
