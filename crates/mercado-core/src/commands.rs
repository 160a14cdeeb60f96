//! # Commands
//!
//! Raw input payloads for each use case. Nothing here is trusted: every
//! command goes through [`crate::validation`] before it touches an entity.
//!
//! Quantities are `i64` so that zero and negative input can be reported as
//! validation failures instead of being unrepresentable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{SaleItemStatus, SaleStatus};

/// One line as submitted with a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemInput {
    /// Existing line to revise (update only). New lines leave this empty.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    /// Caller-supplied discount. Only bound-checked; the stored discount is
    /// always recomputed from the quantity tier.
    #[serde(default)]
    pub discount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSale {
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub branch_id: Uuid,
    pub customer_id: Uuid,
    #[serde(default)]
    pub items: Vec<SaleItemInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSale {
    pub id: Uuid,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub branch_id: Uuid,
    pub customer_id: Uuid,
    #[serde(default)]
    pub status: SaleStatus,
    #[serde(default)]
    pub items: Vec<SaleItemInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleItem {
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub status: SaleItemStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSales {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for ListSales {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_sale_from_json() {
        let json = r#"{
            "saleNumber": "1001",
            "saleDate": "2024-03-01T10:00:00Z",
            "branchId": "6f1c8a2e-6f5b-4d3e-9c1a-1b2c3d4e5f60",
            "customerId": "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d",
            "items": [
                { "productId": "11111111-2222-4333-8444-555555555555", "quantity": 4, "unitPrice": "19.90" }
            ]
        }"#;
        let cmd: CreateSale = serde_json::from_str(json).unwrap();
        assert_eq!(cmd.sale_number, "1001");
        assert_eq!(cmd.items.len(), 1);
        assert_eq!(cmd.items[0].unit_price, dec!(19.90));
        assert_eq!(cmd.items[0].discount, Decimal::ZERO);
        assert!(cmd.items[0].id.is_none());
    }

    #[test]
    fn test_update_sale_defaults_to_active() {
        let json = r#"{
            "id": "6f1c8a2e-6f5b-4d3e-9c1a-1b2c3d4e5f60",
            "saleNumber": "1001",
            "saleDate": "2024-03-01T10:00:00Z",
            "branchId": "6f1c8a2e-6f5b-4d3e-9c1a-1b2c3d4e5f60",
            "customerId": "0a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d"
        }"#;
        let cmd: UpdateSale = serde_json::from_str(json).unwrap();
        assert_eq!(cmd.status, SaleStatus::Active);
        assert!(cmd.items.is_empty());
    }
}
