//! # Directory Repository
//!
//! Branches and customers. Sales keep only their ids; nothing in the sale
//! rules reads these records.

use mercado_core::{Branch, Customer};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::get_uuid;
use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: SqlitePool,
}

fn branch_from_row(row: &SqliteRow) -> DbResult<Branch> {
    Ok(Branch {
        id: get_uuid(row, "id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        country: row.try_get("country")?,
        phone_number: row.try_get("phone_number")?,
    })
}

fn customer_from_row(row: &SqliteRow) -> DbResult<Customer> {
    Ok(Customer {
        id: get_uuid(row, "id")?,
        external_id: row.try_get("external_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone_number: row.try_get("phone_number")?,
        registered_at: row.try_get("registered_at")?,
    })
}

impl DirectoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DirectoryRepository { pool }
    }

    // =========================================================================
    // Branches
    // =========================================================================

    pub async fn insert_branch(&self, branch: &Branch) -> DbResult<Branch> {
        debug!(id = %branch.id, name = %branch.name, "Inserting branch");

        sqlx::query(
            r#"
            INSERT INTO branches (id, name, address, city, state, country, phone_number)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(branch.id.to_string())
        .bind(&branch.name)
        .bind(&branch.address)
        .bind(&branch.city)
        .bind(&branch.state)
        .bind(&branch.country)
        .bind(&branch.phone_number)
        .execute(&self.pool)
        .await?;

        Ok(branch.clone())
    }

    pub async fn get_branch(&self, id: Uuid) -> DbResult<Option<Branch>> {
        let row = sqlx::query(
            "SELECT id, name, address, city, state, country, phone_number FROM branches WHERE id = ?1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(branch_from_row).transpose()
    }

    pub async fn list_branches(&self) -> DbResult<Vec<Branch>> {
        let rows = sqlx::query(
            "SELECT id, name, address, city, state, country, phone_number FROM branches ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(branch_from_row).collect()
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub async fn insert_customer(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, external_id, name, email, phone_number, registered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(customer.id.to_string())
        .bind(&customer.external_id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(customer.registered_at)
        .execute(&self.pool)
        .await?;

        Ok(customer.clone())
    }

    pub async fn get_customer(&self, id: Uuid) -> DbResult<Option<Customer>> {
        let row = sqlx::query(
            "SELECT id, external_id, name, email, phone_number, registered_at FROM customers WHERE id = ?1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(customer_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_branch_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.directory();
        let branch = Branch {
            id: Uuid::new_v4(),
            name: "Centro".into(),
            address: Some("Rua Augusta 100".into()),
            city: Some("São Paulo".into()),
            state: Some("SP".into()),
            country: Some("BR".into()),
            phone_number: None,
        };
        repo.insert_branch(&branch).await.unwrap();

        assert_eq!(repo.get_branch(branch.id).await.unwrap(), Some(branch.clone()));
        assert_eq!(repo.list_branches().await.unwrap(), vec![branch]);
        assert!(repo.get_branch(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_customer_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.directory();
        let customer = Customer {
            id: Uuid::new_v4(),
            external_id: Some("CRM-42".into()),
            name: "Ana Souza".into(),
            email: Some("ana@example.com".into()),
            phone_number: None,
            registered_at: Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap(),
        };
        repo.insert_customer(&customer).await.unwrap();

        assert_eq!(repo.get_customer(customer.id).await.unwrap(), Some(customer));
    }
}
