//! # mercado-db: Database Layer for Mercado
//!
//! SQLite storage for sales, sale items, reference data and the domain
//! event outbox, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mercado Sales Data Flow                            │
//! │                                                                         │
//! │  Command handler (mercado-app)                                         │
//! │       │  Arc<dyn SaleRepository>, Arc<dyn SaleItemRepository>          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   mercado-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│  sale          │    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │  sale_item     │    │ 001_init.sql │  │   │
//! │  │   │               │    │  outbox, ...   │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (file, WAL mode) or :memory: for tests                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mercado_db::{Database, DbConfig, Include, Repository};
//!
//! let db = Database::new(DbConfig::new("mercado.db")).await?;
//! let sale = db.sales().get_by_id(id, &[Include::SaleItems]).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::directory::DirectoryRepository;
pub use repository::outbox::{EventOutboxRepository, OutboxEntry};
pub use repository::product::ProductRepository;
pub use repository::sale::SqliteSaleRepository;
pub use repository::sale_item::SqliteSaleItemRepository;
pub use repository::{Include, Repository, SaleItemRepository, SaleRepository};
