//! # Product Repository
//!
//! Catalog storage. Sales only reference products by id; prices on sale
//! lines are captured from the command, not looked up here.

use mercado_core::{Page, PageRequest, Product};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{get_money, get_uuid, limit_offset};
use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, category, stock_quantity, supplier, product_code";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
/// let product = repo.get_by_code("BEER-600").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

fn product_from_row(row: &SqliteRow) -> DbResult<Product> {
    Ok(Product {
        id: get_uuid(row, "id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: get_money(row, "price")?,
        category: row.try_get("category")?,
        stock_quantity: row.try_get("stock_quantity")?,
        supplier: row.try_get("supplier")?,
        product_code: row.try_get("product_code")?,
    })
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product. A taken product code is a `UniqueViolation`.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, code = %product.product_code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price, category, stock_quantity, supplier, product_code
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(product.id.to_string())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount().to_string())
        .bind(&product.category)
        .bind(product.stock_quantity)
        .bind(&product.supplier)
        .bind(&product.product_code)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, product.product_code.clone()),
            other => other,
        })?;

        Ok(product.clone())
    }

    pub async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    pub async fn get_by_code(&self, product_code: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_code = ?1");
        let row = sqlx::query(&sql)
            .bind(product_code)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    /// Products ordered by name.
    pub async fn list_page(&self, page: PageRequest) -> DbResult<Page<Product>> {
        let total = self.count().await?;

        let (limit, offset) = limit_offset(page);
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name LIMIT ?1 OFFSET ?2");
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            items: rows.iter().map(product_from_row).collect::<DbResult<_>>()?,
            total_count: total.max(0) as u64,
            page_number: page.page_number,
            page_size: page.page_size,
        })
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
