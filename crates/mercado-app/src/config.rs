//! Application configuration.
//!
//! Loaded from `MERCADO_*` environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;

use mercado_core::commands::ListSales;
use mercado_core::validation::{DiscountBound, SaleNumberRules, ValidationConfig};
use mercado_db::DbConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_FILTER: &str = "info,mercado=debug,sqlx=warn";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite file path, or `:memory:`
    pub database_path: PathBuf,

    pub max_connections: u32,

    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Reject non-numeric sale numbers
    pub require_numeric_sale_number: bool,

    /// Reject a nonzero discount on lines below 4 units
    pub reject_discount_below_tier: bool,

    /// Page size used when a list request does not name one
    pub default_page_size: u32,

    pub max_page_size: u32,

    /// Append published events to the `event_outbox` table
    pub outbox_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("mercado.db"),
            max_connections: 5,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            require_numeric_sale_number: false,
            reject_discount_below_tier: false,
            default_page_size: 10,
            max_page_size: 100,
            outbox_enabled: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let config = AppConfig {
            database_path: lookup("MERCADO_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_or(&lookup, "MERCADO_MAX_CONNECTIONS", defaults.max_connections)?,

            log_filter: lookup("MERCADO_LOG").unwrap_or(defaults.log_filter),

            require_numeric_sale_number: parse_or(
                &lookup,
                "MERCADO_NUMERIC_SALE_NUMBERS",
                defaults.require_numeric_sale_number,
            )?,

            reject_discount_below_tier: parse_or(
                &lookup,
                "MERCADO_REJECT_DISCOUNT_BELOW_TIER",
                defaults.reject_discount_below_tier,
            )?,

            default_page_size: parse_or(&lookup, "MERCADO_DEFAULT_PAGE_SIZE", defaults.default_page_size)?,

            max_page_size: parse_or(&lookup, "MERCADO_MAX_PAGE_SIZE", defaults.max_page_size)?,

            outbox_enabled: parse_or(&lookup, "MERCADO_OUTBOX_ENABLED", defaults.outbox_enabled)?,
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("MERCADO_MAX_CONNECTIONS".to_string()));
        }
        if config.max_page_size == 0 {
            return Err(ConfigError::InvalidValue("MERCADO_MAX_PAGE_SIZE".to_string()));
        }
        if config.default_page_size == 0 || config.default_page_size > config.max_page_size {
            return Err(ConfigError::InvalidValue("MERCADO_DEFAULT_PAGE_SIZE".to_string()));
        }

        Ok(config)
    }

    pub fn db_config(&self) -> DbConfig {
        if self.database_path.as_os_str() == ":memory:" {
            return DbConfig::in_memory();
        }
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }

    /// First page at the configured default size.
    pub fn first_page(&self) -> ListSales {
        ListSales {
            page_number: 1,
            page_size: self.default_page_size,
        }
    }

    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            sale_number: SaleNumberRules {
                require_non_empty: true,
                require_numeric: self.require_numeric_sale_number,
            },
            item_discount_on_create: DiscountBound::UnitPrice,
            item_discount_on_update: DiscountBound::LineSubtotal,
            reject_discount_below_tier: self.reject_discount_below_tier,
            max_page_size: self.max_page_size,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
