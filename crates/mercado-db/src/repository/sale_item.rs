//! # Sale Item Repository
//!
//! Direct access to single sale lines, used by the item handlers. Lines keep
//! their insertion order through the `position` column.

use async_trait::async_trait;
use mercado_core::{Page, PageRequest, SaleItem, SaleItemStatus};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{get_money, get_u32, get_uuid, limit_offset, Include, Repository, SaleItemRepository};
use crate::error::DbResult;

pub(crate) const ITEM_COLUMNS: &str =
    "id, sale_id, product_id, quantity, unit_price, discount, status";

#[derive(Debug, Clone)]
pub struct SqliteSaleItemRepository {
    pool: SqlitePool,
}

impl SqliteSaleItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSaleItemRepository { pool }
    }
}

pub(crate) fn item_from_row(row: &SqliteRow) -> DbResult<SaleItem> {
    let status: SaleItemStatus = row.try_get("status")?;
    Ok(SaleItem::restore(
        get_uuid(row, "id")?,
        get_uuid(row, "sale_id")?,
        get_uuid(row, "product_id")?,
        get_u32(row, "quantity")?,
        get_money(row, "unit_price")?,
        get_money(row, "discount")?,
        status,
    ))
}

/// Inserts one line at an explicit position (used inside sale transactions).
pub(crate) async fn insert_item<'e, E>(executor: E, item: &SaleItem, position: i64) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, position, quantity, unit_price, discount, status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(item.id().to_string())
    .bind(item.sale_id().to_string())
    .bind(item.product_id().to_string())
    .bind(position)
    .bind(i64::from(item.quantity()))
    .bind(item.unit_price().amount().to_string())
    .bind(item.discount().amount().to_string())
    .bind(item.status())
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn fetch_items_for_sale<'e, E>(executor: E, sale_id: Uuid) -> DbResult<Vec<SaleItem>>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY position");
    let rows = sqlx::query(&sql)
        .bind(sale_id.to_string())
        .fetch_all(executor)
        .await?;
    rows.iter().map(item_from_row).collect()
}

#[async_trait]
impl Repository<SaleItem> for SqliteSaleItemRepository {
    /// Appends the line after the last existing line of its sale.
    async fn create(&self, item: &SaleItem) -> DbResult<SaleItem> {
        debug!(id = %item.id(), sale_id = %item.sale_id(), "Inserting sale item");

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, position, quantity, unit_price, discount, status
            ) VALUES (
                ?1, ?2, ?3,
                (SELECT COALESCE(MAX(position), -1) + 1 FROM sale_items WHERE sale_id = ?2),
                ?4, ?5, ?6, ?7
            )
            "#,
        )
        .bind(item.id().to_string())
        .bind(item.sale_id().to_string())
        .bind(item.product_id().to_string())
        .bind(i64::from(item.quantity()))
        .bind(item.unit_price().amount().to_string())
        .bind(item.discount().amount().to_string())
        .bind(item.status())
        .execute(&self.pool)
        .await?;

        Ok(item.clone())
    }

    async fn get_by_id(&self, id: Uuid, _include: &[Include]) -> DbResult<Option<SaleItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn update(&self, item: &SaleItem) -> DbResult<Option<SaleItem>> {
        debug!(id = %item.id(), status = %item.status(), "Updating sale item");

        let result = sqlx::query(
            r#"
            UPDATE sale_items
            SET product_id = ?2, quantity = ?3, unit_price = ?4, discount = ?5, status = ?6
            WHERE id = ?1
            "#,
        )
        .bind(item.id().to_string())
        .bind(item.product_id().to_string())
        .bind(i64::from(item.quantity()))
        .bind(item.unit_price().amount().to_string())
        .bind(item.discount().amount().to_string())
        .bind(item.status())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(item.clone()))
    }

    async fn delete(&self, id: Uuid) -> DbResult<bool> {
        debug!(id = %id, "Deleting sale item");

        let result = sqlx::query("DELETE FROM sale_items WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_page(&self, page: PageRequest, _include: &[Include]) -> DbResult<Page<SaleItem>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_items")
            .fetch_one(&self.pool)
            .await?;

        let (limit, offset) = limit_offset(page);
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items ORDER BY sale_id, position LIMIT ?1 OFFSET ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items: rows.iter().map(item_from_row).collect::<DbResult<_>>()?,
            total_count: total.max(0) as u64,
            page_number: page.page_number,
            page_size: page.page_size,
        })
    }
}

#[async_trait]
impl SaleItemRepository for SqliteSaleItemRepository {
    async fn list_for_sale(&self, sale_id: Uuid) -> DbResult<Vec<SaleItem>> {
        fetch_items_for_sale(&self.pool, sale_id).await
    }
}
