//! # Sale Repository
//!
//! Sales are stored as one `sales` row plus their `sale_items` rows.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(sale)                                                           │
//! │     BEGIN                                                               │
//! │     └── INSERT sales                                                    │
//! │     └── INSERT sale_items (position 0..n)                               │
//! │     COMMIT                                                              │
//! │                                                                         │
//! │  update(sale)                                                           │
//! │     BEGIN                                                               │
//! │     └── UPDATE sales ──── 0 rows? ──► ROLLBACK, None                    │
//! │     └── DELETE sale_items WHERE sale_id                                 │
//! │     └── INSERT sale_items (position 0..n)                               │
//! │     COMMIT                                                              │
//! │                                                                         │
//! │  delete(id)                                                             │
//! │     └── DELETE sales (items go with it: ON DELETE CASCADE)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sale total is never stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mercado_core::{Page, PageRequest, Sale, SaleHeader, SaleStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::sale_item::{fetch_items_for_sale, insert_item};
use super::{get_uuid, limit_offset, wants, Include, Repository, SaleRepository};
use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str = "id, sale_number, sale_date, customer_id, branch_id, status";

#[derive(Debug, Clone)]
pub struct SqliteSaleRepository {
    pool: SqlitePool,
}

impl SqliteSaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSaleRepository { pool }
    }

    /// Loads the item list when asked to; rows are fully decoded before any
    /// further query runs.
    async fn assemble(&self, head: SaleRow, include: &[Include]) -> DbResult<Sale> {
        let items = if wants(include, Include::SaleItems) {
            fetch_items_for_sale(&self.pool, head.id).await?
        } else {
            Vec::new()
        };
        Ok(Sale::restore(head.id, head.header, head.status, items))
    }

    async fn fetch_one_where(&self, column: &str, value: String, include: &[Include]) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE {column} = ?1");
        let head = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(SaleRow::decode)
            .transpose()?;

        match head {
            Some(head) => Ok(Some(self.assemble(head, include).await?)),
            None => Ok(None),
        }
    }
}

/// The `sales` columns of one row.
struct SaleRow {
    id: Uuid,
    header: SaleHeader,
    status: SaleStatus,
}

impl SaleRow {
    fn decode(row: &SqliteRow) -> DbResult<Self> {
        let sale_date: DateTime<Utc> = row.try_get("sale_date")?;
        Ok(SaleRow {
            id: get_uuid(row, "id")?,
            header: SaleHeader {
                sale_number: row.try_get("sale_number")?,
                sale_date,
                customer_id: get_uuid(row, "customer_id")?,
                branch_id: get_uuid(row, "branch_id")?,
            },
            status: row.try_get("status")?,
        })
    }
}

#[async_trait]
impl Repository<Sale> for SqliteSaleRepository {
    async fn create(&self, sale: &Sale) -> DbResult<Sale> {
        debug!(id = %sale.id(), sale_number = %sale.sale_number(), items = sale.items().len(), "Inserting sale");

        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number, sale_date, customer_id, branch_id, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(sale.id().to_string())
        .bind(sale.sale_number())
        .bind(sale.sale_date())
        .bind(sale.customer_id().to_string())
        .bind(sale.branch_id().to_string())
        .bind(sale.status())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (position, item) in sale.items().iter().enumerate() {
            insert_item(&mut *tx, item, position as i64).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(sale.clone())
    }

    async fn get_by_id(&self, id: Uuid, include: &[Include]) -> DbResult<Option<Sale>> {
        self.fetch_one_where("id", id.to_string(), include).await
    }

    async fn update(&self, sale: &Sale) -> DbResult<Option<Sale>> {
        debug!(id = %sale.id(), status = %sale.status(), "Updating sale");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE sales
            SET sale_number = ?2, sale_date = ?3, customer_id = ?4, branch_id = ?5,
                status = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(sale.id().to_string())
        .bind(sale.sale_number())
        .bind(sale.sale_date())
        .bind(sale.customer_id().to_string())
        .bind(sale.branch_id().to_string())
        .bind(sale.status())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            return Ok(None);
        }

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(sale.id().to_string())
            .execute(&mut *tx)
            .await?;

        for (position, item) in sale.items().iter().enumerate() {
            insert_item(&mut *tx, item, position as i64).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(Some(sale.clone()))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Newest sales first, regardless of status.
    async fn list_page(&self, page: PageRequest, include: &[Include]) -> DbResult<Page<Sale>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        let (limit, offset) = limit_offset(page);
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY sale_date DESC, sale_number LIMIT ?1 OFFSET ?2"
        );
        let heads = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(SaleRow::decode)
            .collect::<DbResult<Vec<_>>>()?;

        let mut sales = Vec::with_capacity(heads.len());
        for head in heads {
            sales.push(self.assemble(head, include).await?);
        }

        Ok(Page {
            items: sales,
            total_count: total.max(0) as u64,
            page_number: page.page_number,
            page_size: page.page_size,
        })
    }
}

#[async_trait]
impl SaleRepository for SqliteSaleRepository {
    async fn get_by_sale_number(&self, sale_number: &str, include: &[Include]) -> DbResult<Option<Sale>> {
        self.fetch_one_where("sale_number", sale_number.to_string(), include)
            .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
