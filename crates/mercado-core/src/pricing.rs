//! # Quantity-Tiered Discounts
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quantity   │  tier      │  discount                                   │
//! │  ───────────┼────────────┼──────────────────────────────────────────── │
//! │   1 ..= 3   │  None      │  0                                          │
//! │   4 ..= 9   │  Standard  │  10% of quantity × unit price               │
//! │  10 ..= 20  │  Bulk      │  20% of quantity × unit price               │
//! │    > 20     │  —         │  QuantityLimitExceeded (never priced)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

/// Most identical units a single line may carry.
pub const MAX_ITEM_QUANTITY: u32 = 20;

/// Smallest quantity that earns any discount.
pub const MIN_DISCOUNT_QUANTITY: u32 = 4;

/// Smallest quantity that earns the bulk rate.
pub const BULK_DISCOUNT_QUANTITY: u32 = 10;

/// Highest accepted unit price (one billion).
///
/// Keeps `unit price × 20 × 2000 bps` well inside `Decimal` range.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountTier {
    None,
    Standard,
    Bulk,
}

impl DiscountTier {
    /// Picks the tier for a line quantity.
    ///
    /// Fails for quantities above [`MAX_ITEM_QUANTITY`].
    pub fn for_quantity(quantity: u32) -> CoreResult<Self> {
        validate_quantity(quantity)?;
        Ok(match quantity {
            q if q >= BULK_DISCOUNT_QUANTITY => DiscountTier::Bulk,
            q if q >= MIN_DISCOUNT_QUANTITY => DiscountTier::Standard,
            _ => DiscountTier::None,
        })
    }

    /// Rate in basis points (1000 bps = 10%).
    pub const fn rate_bps(&self) -> u32 {
        match self {
            DiscountTier::None => 0,
            DiscountTier::Standard => 1_000,
            DiscountTier::Bulk => 2_000,
        }
    }
}

/// Rejects quantities above [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(quantity: u32) -> CoreResult<()> {
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityLimitExceeded {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Discount for `quantity` units at `unit_price`, exact.
///
/// A line whose amounts do not fit in a `Decimal` is rejected on `unit_price`.
pub fn discount_for(quantity: u32, unit_price: Money) -> CoreResult<Money> {
    let tier = DiscountTier::for_quantity(quantity)?;
    unit_price
        .checked_multiply_quantity(quantity)
        .and_then(|subtotal| subtotal.percentage(tier.rate_bps()))
        .ok_or_else(|| unit_price_out_of_range().into())
}

pub(crate) fn unit_price_out_of_range() -> ValidationError {
    ValidationError::OutOfRange {
        field: "unit_price".to_string(),
        min: "0".to_string(),
        max: MAX_UNIT_PRICE.to_string(),
    }
}
