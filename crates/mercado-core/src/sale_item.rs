//! # Sale Item
//!
//! One line of a sale: a product, how many units, at what price, and the
//! discount the quantity earns.
//!
//! ## Lifecycle
//! ```text
//! new ──► apply_discount ──► Active ──── revise ───► Active
//!                              │
//!                              └── cancel ──► Canceled (terminal)
//! ```
//!
//! The discount is never set directly: it is recomputed from
//! quantity and unit price every time either changes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::events::SaleItemCanceled;
use crate::money::Money;
use crate::pricing;
use crate::types::SaleItemStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    id: Uuid,
    sale_id: Uuid,
    product_id: Uuid,
    quantity: u32,
    unit_price: Money,
    discount: Money,
    status: SaleItemStatus,
}

impl SaleItem {
    /// A new Active line with no discount applied yet and no owning sale.
    pub fn new(id: Uuid, product_id: Uuid, quantity: u32, unit_price: Money) -> Self {
        Self {
            id,
            sale_id: Uuid::nil(),
            product_id,
            quantity,
            unit_price,
            discount: Money::zero(),
            status: SaleItemStatus::Active,
        }
    }

    /// Rebuilds a line from stored values without re-running any rule.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        sale_id: Uuid,
        product_id: Uuid,
        quantity: u32,
        unit_price: Money,
        discount: Money,
        status: SaleItemStatus,
    ) -> Self {
        Self {
            id,
            sale_id,
            product_id,
            quantity,
            unit_price,
            discount,
            status,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sale_id(&self) -> Uuid {
        self.sale_id
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn status(&self) -> SaleItemStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SaleItemStatus::Active
    }

    /// unit price × quantity
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// unit price × quantity − discount
    pub fn total(&self) -> Money {
        self.subtotal() - self.discount
    }

    // =========================================================================
    // Rules
    // =========================================================================

    /// Fails when the line carries more than 20 units.
    pub fn validate_quantity(&self) -> CoreResult<()> {
        pricing::validate_quantity(self.quantity)
    }

    /// Recomputes the discount from the quantity tier.
    ///
    /// Leaves the current discount untouched when the quantity is over the limit.
    pub fn apply_discount(&mut self) -> CoreResult<()> {
        self.discount = pricing::discount_for(self.quantity, self.unit_price)?;
        Ok(())
    }

    /// Replaces product, quantity and price, then re-prices the line.
    ///
    /// Nothing changes if the item is cancelled or the new line cannot be
    /// priced.
    pub fn revise(&mut self, product_id: Uuid, quantity: u32, unit_price: Money) -> CoreResult<()> {
        self.ensure_active()?;
        let discount = pricing::discount_for(quantity, unit_price)?;

        self.product_id = product_id;
        self.quantity = quantity;
        self.unit_price = unit_price;
        self.discount = discount;
        Ok(())
    }

    /// Active → Canceled. A second cancel is a conflict.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> CoreResult<SaleItemCanceled> {
        self.ensure_active()?;
        self.status = SaleItemStatus::Canceled;
        Ok(SaleItemCanceled {
            item_id: self.id,
            sale_id: self.sale_id,
            canceled_at: at,
        })
    }

    pub fn ensure_active(&self) -> CoreResult<()> {
        if self.status == SaleItemStatus::Canceled {
            return Err(CoreError::conflict(
                EntityKind::SaleItem,
                self.id,
                "is already cancelled",
            ));
        }
        Ok(())
    }

    pub(crate) fn attach_to(&mut self, sale_id: Uuid) {
        self.sale_id = sale_id;
    }
}
