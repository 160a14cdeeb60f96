//! # mercado-app: Command Handlers for Mercado
//!
//! Orchestrates the sales domain: each handler validates a command, loads
//! what it needs through the repository traits, lets `mercado-core` decide,
//! persists the result and publishes the events the change produced.
//!
//! ## Module Organization
//! ```text
//! mercado_app/
//! ├── lib.rs          ◄─── You are here (bootstrap)
//! ├── config.rs       ◄─── MERCADO_* environment configuration
//! ├── telemetry.rs    ◄─── tracing subscriber setup
//! ├── state.rs        ◄─── AppState (repositories, policy, publisher)
//! ├── cancel.rs       ◄─── CancelSource / CancelToken
//! ├── publisher.rs    ◄─── EventPublisher + logging/outbox publishers
//! ├── results.rs      ◄─── Serializable handler results
//! ├── error.rs        ◄─── AppError and ErrorResponse
//! ├── handlers/
//! │   ├── mod.rs      ◄─── Shared loaders
//! │   ├── sale.rs     ◄─── Sale use cases
//! │   └── sale_item.rs◄─── Sale item use cases
//! └── bin/seed.rs     ◄─── Demo data through the real handlers
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. AppConfig::load()            ◄── env vars, defaults                 │
//! │  2. telemetry::init_tracing()    ◄── RUST_LOG overrides config filter   │
//! │  3. bootstrap(&config)           ◄── pool + migrations + AppState       │
//! │  4. handlers::*(&state, cmd, &token)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod handlers;
pub mod publisher;
pub mod results;
pub mod state;
pub mod telemetry;

use mercado_db::{Database, DbError};
use tracing::info;

pub use cancel::{CancelSource, CancelToken};
pub use config::{AppConfig, ConfigError};
pub use error::{AppError, AppResult, ErrorCode, ErrorResponse};
pub use results::{DeleteResult, SaleItemResult, SaleListResult, SaleResult};
pub use state::AppState;

/// Opens the database described by `config` and wires the handler state.
///
/// Fails when the freshly opened pool cannot answer a query.
pub async fn bootstrap(config: &AppConfig) -> AppResult<(Database, AppState)> {
    let db = Database::new(config.db_config()).await?;
    if !db.health_check().await {
        return Err(DbError::ConnectionFailed("health check failed".to_string()).into());
    }
    let state = AppState::from_database(&db, config);
    info!(path = %config.database_path.display(), "Mercado ready");
    Ok((db, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{create_cmd, line};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_bootstrap_in_memory_with_outbox() {
        let config = AppConfig {
            database_path: ":memory:".into(),
            ..AppConfig::default()
        };
        let (db, state) = bootstrap(&config).await.unwrap();

        handlers::create_sale(&state, create_cmd("1001", vec![line(1, dec!(10))]), &CancelToken::never())
            .await
            .unwrap();

        assert_eq!(db.event_outbox().count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_without_outbox() {
        let config = AppConfig {
            database_path: ":memory:".into(),
            outbox_enabled: false,
            ..AppConfig::default()
        };
        let (db, state) = bootstrap(&config).await.unwrap();

        handlers::create_sale(&state, create_cmd("1001", vec![line(1, dec!(10))]), &CancelToken::never())
            .await
            .unwrap();

        assert_eq!(db.event_outbox().count_pending().await.unwrap(), 0);
    }
}
