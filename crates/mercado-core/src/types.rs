//! # Domain Types
//!
//! Status enums, reference data and paging types shared by every layer.
//!
//! ## Status Machines
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleStatus                          SaleItemStatus                     │
//! │                                                                         │
//! │        ┌──► Canceled (terminal)          Active ──► Canceled (terminal) │
//! │  Active┤                                                                │
//! │        └──► Completed (terminal)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Sale Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Open for edits.
    #[default]
    Active,
    /// Cancelled; rejects every further change.
    Canceled,
    /// Finalised; rejects every further change.
    Completed,
}

impl SaleStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SaleStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Active => "active",
            SaleStatus::Canceled => "canceled",
            SaleStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Sale Item Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleItemStatus {
    #[default]
    Active,
    Canceled,
}

impl SaleItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleItemStatus::Active => "active",
            SaleItemStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for SaleItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Reference Data
// =============================================================================
// Sales hold only the ids of these records; they are never joined into
// pricing or status decisions.

/// A sellable product from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub category: Option<String>,
    pub stock_quantity: i64,
    pub supplier: Option<String>,
    pub product_code: String,
}

/// A store location where sales are registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    /// Identifier in the customer's system of record.
    pub external_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub registered_at: DateTime<Utc>,
}

// =============================================================================
// Paging
// =============================================================================

/// A validated page request (both values start at 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// Rows to skip for this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number.saturating_sub(1)) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}
