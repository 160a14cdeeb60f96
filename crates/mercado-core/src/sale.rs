//! # Sale Aggregate
//!
//! A sale owns its ordered list of items. Nothing outside the sale holds a
//! reference into that list; every change goes through the methods below.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create(header, items)   add_item each ──► Active      ──► SaleCreated  │
//! │  revise(header, status,  guard ──► re-add items        ──► SaleModified │
//! │         items)                    (status=canceled also ► SaleCanceled) │
//! │  cancel()                Active ──► Canceled           ──► SaleCanceled │
//! │  complete()              Active ──► Completed          ──► SaleModified │
//! │                                                                         │
//! │  Canceled and Completed sales reject every one of these.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::events::{SaleCanceled, SaleCreated, SaleEvent, SaleModified};
use crate::money::Money;
use crate::sale_item::SaleItem;
use crate::types::SaleStatus;

/// Fields of a sale that a command may set directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleHeader {
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: Uuid,
    pub branch_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    id: Uuid,
    sale_number: String,
    sale_date: DateTime<Utc>,
    customer_id: Uuid,
    branch_id: Uuid,
    items: Vec<SaleItem>,
    status: SaleStatus,
}

impl Sale {
    /// Builds an Active sale, pricing every item on the way in.
    ///
    /// One item over the quantity limit fails the whole sale.
    pub fn create(id: Uuid, header: SaleHeader, items: Vec<SaleItem>) -> CoreResult<(Self, SaleCreated)> {
        let mut sale = Sale {
            id,
            sale_number: header.sale_number,
            sale_date: header.sale_date,
            customer_id: header.customer_id,
            branch_id: header.branch_id,
            items: Vec::with_capacity(items.len()),
            status: SaleStatus::Active,
        };

        for item in items {
            sale.add_item(item)?;
        }

        let event = SaleCreated {
            sale_id: sale.id,
            sale_number: sale.sale_number.clone(),
            created_at: sale.sale_date,
        };
        Ok((sale, event))
    }

    /// Rebuilds a sale from stored values without re-running any rule.
    pub fn restore(id: Uuid, header: SaleHeader, status: SaleStatus, items: Vec<SaleItem>) -> Self {
        Sale {
            id,
            sale_number: header.sale_number,
            sale_date: header.sale_date,
            customer_id: header.customer_id,
            branch_id: header.branch_id,
            items,
            status,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sale_number(&self) -> &str {
        &self.sale_number
    }

    pub fn sale_date(&self) -> DateTime<Utc> {
        self.sale_date
    }

    pub fn customer_id(&self) -> Uuid {
        self.customer_id
    }

    pub fn branch_id(&self) -> Uuid {
        self.branch_id
    }

    pub fn status(&self) -> SaleStatus {
        self.status
    }

    pub fn items(&self) -> &[SaleItem] {
        &self.items
    }

    pub fn item(&self, item_id: Uuid) -> Option<&SaleItem> {
        self.items.iter().find(|i| i.id() == item_id)
    }

    pub fn header(&self) -> SaleHeader {
        SaleHeader {
            sale_number: self.sale_number.clone(),
            sale_date: self.sale_date,
            customer_id: self.customer_id,
            branch_id: self.branch_id,
        }
    }

    /// Sum of the totals of the items that are still active.
    ///
    /// Always computed from the current items, never stored.
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .filter(|i| i.is_active())
            .map(SaleItem::total)
            .sum()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Fails unless the sale is Active.
    pub fn ensure_mutable(&self) -> CoreResult<()> {
        match self.status {
            SaleStatus::Active => Ok(()),
            SaleStatus::Canceled => Err(CoreError::conflict(
                EntityKind::Sale,
                self.id,
                "is already cancelled and cannot be updated",
            )),
            SaleStatus::Completed => Err(CoreError::conflict(
                EntityKind::Sale,
                self.id,
                "is completed and cannot be updated",
            )),
        }
    }

    /// Validates the quantity, prices the item and attaches it to this sale.
    pub fn add_item(&mut self, item: SaleItem) -> CoreResult<()> {
        self.ensure_mutable()?;
        let item = self.prepare_item(item)?;
        self.items.push(item);
        Ok(())
    }

    /// Replaces the header and the active item list, and moves the status.
    ///
    /// Cancelled items already on the sale are kept as history. Every new
    /// item is priced before anything is assigned, so a failure leaves the
    /// sale unchanged.
    pub fn revise(
        &mut self,
        header: SaleHeader,
        status: SaleStatus,
        items: Vec<SaleItem>,
        at: DateTime<Utc>,
    ) -> CoreResult<Vec<SaleEvent>> {
        self.ensure_mutable()?;

        let mut prepared = Vec::with_capacity(items.len());
        for item in items {
            prepared.push(self.prepare_item(item)?);
        }

        let mut events = Vec::new();

        self.sale_number = header.sale_number;
        self.sale_date = header.sale_date;
        self.customer_id = header.customer_id;
        self.branch_id = header.branch_id;

        let mut next: Vec<SaleItem> = self
            .items
            .drain(..)
            .filter(|i| !i.is_active() && !prepared.iter().any(|p| p.id() == i.id()))
            .collect();
        next.extend(prepared);
        self.items = next;

        match status {
            SaleStatus::Active => {}
            SaleStatus::Canceled => {
                self.status = SaleStatus::Canceled;
                events.push(self.canceled_event(at).into());
            }
            SaleStatus::Completed => self.status = SaleStatus::Completed,
        }

        events.push(self.modified_event(at).into());
        Ok(events)
    }

    /// Active → Canceled.
    pub fn cancel(&mut self, at: DateTime<Utc>) -> CoreResult<SaleCanceled> {
        self.ensure_mutable()?;
        self.status = SaleStatus::Canceled;
        Ok(self.canceled_event(at))
    }

    /// Active → Completed. A completed sale cannot be completed again.
    pub fn complete(&mut self, at: DateTime<Utc>) -> CoreResult<SaleModified> {
        self.ensure_mutable()?;
        self.status = SaleStatus::Completed;
        Ok(self.modified_event(at))
    }

    fn prepare_item(&self, mut item: SaleItem) -> CoreResult<SaleItem> {
        item.ensure_active()?;
        item.validate_quantity()?;
        item.apply_discount()?;
        item.attach_to(self.id);
        Ok(item)
    }

    fn canceled_event(&self, at: DateTime<Utc>) -> SaleCanceled {
        SaleCanceled {
            sale_id: self.id,
            sale_number: self.sale_number.clone(),
            canceled_at: at,
        }
    }

    fn modified_event(&self, at: DateTime<Utc>) -> SaleModified {
        SaleModified {
            sale_id: self.id,
            sale_number: self.sale_number.clone(),
            modified_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::SaleItemStatus;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn header(number: &str) -> SaleHeader {
        SaleHeader {
            sale_number: number.to_string(),
            sale_date: Utc::now() - Duration::hours(1),
            customer_id: Uuid::new_v4(),
            branch_id: Uuid::new_v4(),
        }
    }

    fn line(qty: u32, price: Money) -> SaleItem {
        SaleItem::new(Uuid::new_v4(), Uuid::new_v4(), qty, price)
    }

    fn sample_sale() -> Sale {
        let (sale, _) = Sale::create(
            Uuid::new_v4(),
            header("1001"),
            vec![line(5, Money::new(dec!(100))), line(1, Money::new(dec!(50)))],
        )
        .unwrap();
        sale
    }

    #[test]
    fn test_create_prices_items_and_totals() {
        let sale = sample_sale();
        assert_eq!(sale.status(), SaleStatus::Active);
        assert_eq!(sale.items().len(), 2);
        assert!(sale.items().iter().all(|i| i.sale_id() == sale.id()));
        assert_eq!(sale.total(), Money::new(dec!(500)));
    }

    #[test]
    fn test_create_emits_created_event() {
        let h = header("2002");
        let date = h.sale_date;
        let (sale, event) = Sale::create(Uuid::new_v4(), h, vec![]).unwrap();
        assert_eq!(event.sale_id, sale.id());
        assert_eq!(event.sale_number, "2002");
        assert_eq!(event.created_at, date);
    }

    #[test]
    fn test_create_fails_on_item_over_limit() {
        let err = Sale::create(
            Uuid::new_v4(),
            header("1001"),
            vec![line(2, Money::new(dec!(1))), line(25, Money::new(dec!(1)))],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainInvariant);
        assert_eq!(err.field(), Some("quantity"));
    }

    #[test]
    fn test_cancel_is_one_way() {
        let mut sale = sample_sale();
        let event = sale.cancel(Utc::now()).unwrap();
        assert_eq!(event.sale_id, sale.id());
        assert_eq!(sale.status(), SaleStatus::Canceled);

        assert_eq!(sale.cancel(Utc::now()).unwrap_err().kind(), ErrorKind::Conflict);
        assert_eq!(sale.complete(Utc::now()).unwrap_err().kind(), ErrorKind::Conflict);
        assert_eq!(
            sale.add_item(line(1, Money::new(dec!(1)))).unwrap_err().kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_revise_cancelled_sale_changes_nothing() {
        let mut sale = sample_sale();
        sale.cancel(Utc::now()).unwrap();
        let before = sale.clone();

        let err = sale
            .revise(header("9999"), SaleStatus::Active, vec![], Utc::now())
            .unwrap_err();
        assert!(err.to_string().contains("already cancelled"));
        assert_eq!(sale, before);
    }

    #[test]
    fn test_complete_is_guarded() {
        let mut sale = sample_sale();
        let event = sale.complete(Utc::now()).unwrap();
        assert_eq!(event.sale_id, sale.id());
        assert_eq!(sale.status(), SaleStatus::Completed);
        assert_eq!(sale.complete(Utc::now()).unwrap_err().kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_revise_replaces_items_and_emits_modified() {
        let mut sale = sample_sale();
        let events = sale
            .revise(
                header("1001"),
                SaleStatus::Active,
                vec![line(10, Money::new(dec!(10)))],
                Utc::now(),
            )
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "SaleModified");
        assert_eq!(sale.items().len(), 1);
        assert_eq!(sale.total(), Money::new(dec!(80)));
    }

    #[test]
    fn test_revise_to_canceled_emits_both_events() {
        let mut sale = sample_sale();
        let events = sale
            .revise(sale.header(), SaleStatus::Canceled, vec![], Utc::now())
            .unwrap();
        let types: Vec<_> = events.iter().map(SaleEvent::event_type).collect();
        assert_eq!(types, vec!["SaleCanceled", "SaleModified"]);
        assert_eq!(sale.status(), SaleStatus::Canceled);
    }

    #[test]
    fn test_revise_with_bad_item_is_atomic() {
        let mut sale = sample_sale();
        let before = sale.clone();
        let result = sale.revise(
            header("5555"),
            SaleStatus::Active,
            vec![line(3, Money::new(dec!(1))), line(21, Money::new(dec!(1)))],
            Utc::now(),
        );
        assert!(result.is_err());
        assert_eq!(sale, before);
    }

    #[test]
    fn test_cancelled_items_are_excluded_from_total() {
        let sale = sample_sale();
        let mut items = sale.items().to_vec();
        items[0].cancel(Utc::now()).unwrap();
        let restored = Sale::restore(sale.id(), sale.header(), sale.status(), items);

        assert_eq!(restored.items()[0].status(), SaleItemStatus::Canceled);
        assert_eq!(restored.total(), Money::new(dec!(50)));
    }

    #[test]
    fn test_revise_keeps_cancelled_history() {
        let sale = sample_sale();
        let mut items = sale.items().to_vec();
        items[1].cancel(Utc::now()).unwrap();
        let cancelled_id = items[1].id();
        let mut sale = Sale::restore(sale.id(), sale.header(), sale.status(), items);

        sale.revise(
            sale.header(),
            SaleStatus::Active,
            vec![line(4, Money::new(dec!(25)))],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(sale.items().len(), 2);
        assert!(sale.item(cancelled_id).is_some());
        assert_eq!(sale.total(), Money::new(dec!(90)));
    }
}
