//! # Repository Module
//!
//! The persistence contract the command handlers depend on, plus its SQLite
//! implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Command Handler (mercado-app)                                         │
//! │       │                                                                 │
//! │       │  state.sales.get_by_id(id, &[Include::SaleItems])              │
//! │       ▼                                                                 │
//! │  dyn SaleRepository  ◄── trait (this module)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteSaleRepository ◄── sale.rs                                      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//!
//! | Operation    | Not found signalled by |
//! |--------------|------------------------|
//! | `get_by_id`  | `Ok(None)`             |
//! | `update`     | `Ok(None)`             |
//! | `delete`     | `Ok(false)`            |
//!
//! ## Available Repositories
//!
//! - [`sale::SqliteSaleRepository`] - Sales with their item lists
//! - [`sale_item::SqliteSaleItemRepository`] - Stand-alone item access
//! - [`product::ProductRepository`] - Product catalog
//! - [`directory::DirectoryRepository`] - Branches and customers
//! - [`outbox::EventOutboxRepository`] - Domain event outbox

pub mod directory;
pub mod outbox;
pub mod product;
pub mod sale;
pub mod sale_item;

use std::str::FromStr;

use async_trait::async_trait;
use mercado_core::{Money, Page, PageRequest, Sale, SaleItem};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

// =============================================================================
// Contract
// =============================================================================

/// Related data to load along with an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Include {
    /// A sale's item list, in insertion order.
    SaleItems,
}

pub(crate) fn wants(include: &[Include], what: Include) -> bool {
    include.contains(&what)
}

/// Generic CRUD contract, one implementation per entity type.
#[async_trait]
pub trait Repository<T: Send + Sync>: Send + Sync {
    async fn create(&self, entity: &T) -> DbResult<T>;

    async fn get_by_id(&self, id: Uuid, include: &[Include]) -> DbResult<Option<T>>;

    /// Persists the whole entity. `None` when the id does not exist.
    async fn update(&self, entity: &T) -> DbResult<Option<T>>;

    /// `false` when the id does not exist.
    async fn delete(&self, id: Uuid) -> DbResult<bool>;

    async fn list_page(&self, page: PageRequest, include: &[Include]) -> DbResult<Page<T>>;
}

#[async_trait]
pub trait SaleRepository: Repository<Sale> {
    async fn get_by_sale_number(&self, sale_number: &str, include: &[Include]) -> DbResult<Option<Sale>>;
}

#[async_trait]
pub trait SaleItemRepository: Repository<SaleItem> {
    /// Items of one sale, in insertion order.
    async fn list_for_sale(&self, sale_id: Uuid) -> DbResult<Vec<SaleItem>>;
}

// =============================================================================
// Column Decoding
// =============================================================================
// Ids and decimals are stored as TEXT.

pub(crate) fn get_uuid(row: &SqliteRow, column: &str) -> DbResult<Uuid> {
    let raw: String = row.try_get(column)?;
    Uuid::parse_str(&raw).map_err(|e| DbError::decode(column, e))
}

pub(crate) fn get_money(row: &SqliteRow, column: &str) -> DbResult<Money> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw)
        .map(Money::new)
        .map_err(|e| DbError::decode(column, e))
}

pub(crate) fn get_u32(row: &SqliteRow, column: &str) -> DbResult<u32> {
    let raw: i64 = row.try_get(column)?;
    u32::try_from(raw).map_err(|e| DbError::decode(column, e))
}

/// Clamps a page request into SQLite's signed LIMIT/OFFSET.
pub(crate) fn limit_offset(page: PageRequest) -> (i64, i64) {
    let limit = i64::try_from(page.limit()).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (limit, offset)
}
