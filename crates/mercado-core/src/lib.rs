//! # mercado-core: Pure Business Logic for Mercado Sales
//!
//! Sale pricing and lifecycle rules with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Mercado Sales Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 mercado-app (Command Handlers)                  │   │
//! │  │   create_sale, update_sale, cancel_sale, update_sale_item, ...  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ mercado-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────────┐     │   │
//! │  │   │  money   │ │ pricing  │ │ sale      │ │ validation   │     │   │
//! │  │   │  Money   │ │ tiers    │ │ sale_item │ │ rule pipeline│     │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────────┘     │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐                      │   │
//! │  │   │ commands │ │ events   │ │ service   │                      │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘                      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  mercado-db (Database Layer)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use mercado_core::money::Money;
//! use mercado_core::pricing::discount_for;
//!
//! let unit_price = Money::from_cents(10000); // 100.00
//! let discount = discount_for(5, unit_price).unwrap();
//! assert_eq!(discount, Money::from_cents(5000)); // 10% of 500.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod commands;
pub mod error;
pub mod events;
pub mod money;
pub mod pricing;
pub mod sale;
pub mod sale_item;
pub mod service;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, EntityKind, ErrorKind, ValidationError, ValidationErrors};
pub use events::SaleEvent;
pub use money::Money;
pub use sale::{Sale, SaleHeader};
pub use sale_item::SaleItem;
pub use service::SalesPolicy;
pub use types::*;
pub use validation::ValidationConfig;
