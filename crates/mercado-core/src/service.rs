//! # Pricing / Status Service
//!
//! The one place command handlers go for business decisions. It validates
//! commands, prices items, and guards status transitions, returning the
//! events each change implies. It never performs I/O.
//!
//! ```text
//! handler ──► SalesPolicy::check_*  (rule pipeline, all errors)
//!         ──► SalesPolicy::build_* / revise_* / cancel_*
//!                 │
//!                 ├── Sale::add_item        (bulk path: create / update sale)
//!                 └── SalesPolicy::apply_discount (single item path)
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::commands::{CreateSale, CreateSaleItem, ListSales, SaleItemInput, UpdateSale, UpdateSaleItem};
use crate::error::{CoreError, CoreResult, EntityKind, ValidationError};
use crate::events::{SaleCreated, SaleEvent, SaleItemCanceled};
use crate::money::Money;
use crate::pricing::MAX_ITEM_QUANTITY;
use crate::sale::{Sale, SaleHeader};
use crate::sale_item::SaleItem;
use crate::types::{PageRequest, SaleItemStatus};
use crate::validation::{self, ValidationConfig};

#[derive(Debug, Clone, Default)]
pub struct SalesPolicy {
    config: ValidationConfig,
}

impl SalesPolicy {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    // =========================================================================
    // Command Validation
    // =========================================================================

    pub fn check_create_sale(&self, cmd: &CreateSale, now: DateTime<Utc>) -> CoreResult<()> {
        Ok(validation::validate_create_sale(cmd, &self.config, now)?)
    }

    pub fn check_update_sale(&self, cmd: &UpdateSale, now: DateTime<Utc>) -> CoreResult<()> {
        Ok(validation::validate_update_sale(cmd, &self.config, now)?)
    }

    pub fn check_create_sale_item(&self, cmd: &CreateSaleItem) -> CoreResult<()> {
        Ok(validation::validate_create_sale_item(cmd, &self.config)?)
    }

    pub fn check_update_sale_item(&self, cmd: &UpdateSaleItem) -> CoreResult<()> {
        Ok(validation::validate_update_sale_item(cmd, &self.config)?)
    }

    pub fn check_id(&self, id: Uuid) -> CoreResult<()> {
        Ok(validation::validate_entity_id(id)?)
    }

    /// Validates paging and turns it into a repository request.
    pub fn page_request(&self, cmd: &ListSales) -> CoreResult<PageRequest> {
        validation::validate_list_sales(cmd, &self.config)?;
        Ok(PageRequest::new(cmd.page_number, cmd.page_size))
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Quantity check followed by discount recomputation.
    pub fn apply_discount(&self, item: &mut SaleItem) -> CoreResult<()> {
        item.validate_quantity()?;
        item.apply_discount()
    }

    // =========================================================================
    // Sale Lifecycle
    // =========================================================================

    pub fn build_sale(&self, sale_id: Uuid, cmd: &CreateSale) -> CoreResult<(Sale, SaleCreated)> {
        let items = cmd
            .items
            .iter()
            .map(|input| {
                let quantity = to_quantity(input.quantity)?;
                Ok(SaleItem::new(
                    Uuid::new_v4(),
                    input.product_id,
                    quantity,
                    Money::new(input.unit_price),
                ))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Sale::create(
            sale_id,
            SaleHeader {
                sale_number: cmd.sale_number.trim().to_string(),
                sale_date: cmd.sale_date,
                customer_id: cmd.customer_id,
                branch_id: cmd.branch_id,
            },
            items,
        )
    }

    /// Applies an update command to a loaded sale.
    ///
    /// Inputs carrying an id revise the matching active item; inputs without
    /// one become new items. Active items not mentioned are removed.
    pub fn revise_sale(&self, sale: &mut Sale, cmd: &UpdateSale, at: DateTime<Utc>) -> CoreResult<Vec<SaleEvent>> {
        sale.ensure_mutable()?;

        let items = cmd
            .items
            .iter()
            .map(|input| self.revised_item(sale, input))
            .collect::<CoreResult<Vec<_>>>()?;

        sale.revise(
            SaleHeader {
                sale_number: cmd.sale_number.trim().to_string(),
                sale_date: cmd.sale_date,
                customer_id: cmd.customer_id,
                branch_id: cmd.branch_id,
            },
            cmd.status,
            items,
            at,
        )
    }

    fn revised_item(&self, sale: &Sale, input: &SaleItemInput) -> CoreResult<SaleItem> {
        let quantity = to_quantity(input.quantity)?;
        let unit_price = Money::new(input.unit_price);

        match input.id {
            None => Ok(SaleItem::new(Uuid::new_v4(), input.product_id, quantity, unit_price)),
            Some(id) => {
                let mut item = sale
                    .item(id)
                    .cloned()
                    .ok_or_else(|| CoreError::not_found(EntityKind::SaleItem, id))?;
                item.revise(input.product_id, quantity, unit_price)?;
                Ok(item)
            }
        }
    }

    // =========================================================================
    // Single Item Lifecycle
    // =========================================================================
    // These bypass Sale::add_item: the item is priced through apply_discount
    // directly, with the parent sale only consulted for its status.

    pub fn build_item(&self, sale: &Sale, cmd: &CreateSaleItem) -> CoreResult<SaleItem> {
        sale.ensure_mutable()?;

        let mut item = SaleItem::new(
            Uuid::new_v4(),
            cmd.product_id,
            to_quantity(cmd.quantity)?,
            Money::new(cmd.unit_price),
        );
        self.apply_discount(&mut item)?;
        item.attach_to(sale.id());
        Ok(item)
    }

    /// Revises a stand-alone item; cancels it when the command asks to.
    pub fn revise_item(
        &self,
        item: &mut SaleItem,
        sale: &Sale,
        cmd: &UpdateSaleItem,
        at: DateTime<Utc>,
    ) -> CoreResult<Vec<SaleEvent>> {
        ensure_item_of_sale(item, sale.id())?;
        item.ensure_active()?;
        sale.ensure_mutable()?;

        let quantity = to_quantity(cmd.quantity)?;
        let mut revised = item.clone();
        revised.revise(cmd.product_id, quantity, Money::new(cmd.unit_price))?;

        let mut events = Vec::new();
        if cmd.status == SaleItemStatus::Canceled {
            events.push(revised.cancel(at)?.into());
        }

        *item = revised;
        Ok(events)
    }

    pub fn cancel_item(&self, item: &mut SaleItem, sale: &Sale, at: DateTime<Utc>) -> CoreResult<SaleItemCanceled> {
        ensure_item_of_sale(item, sale.id())?;
        sale.ensure_mutable()?;
        item.cancel(at)
    }

    /// Deleting a line is reported as a cancellation of that line.
    pub fn remove_item(&self, item: &SaleItem, sale: &Sale, at: DateTime<Utc>) -> CoreResult<SaleItemCanceled> {
        ensure_item_of_sale(item, sale.id())?;
        sale.ensure_mutable()?;
        Ok(SaleItemCanceled {
            item_id: item.id(),
            sale_id: sale.id(),
            canceled_at: at,
        })
    }
}

fn ensure_item_of_sale(item: &SaleItem, sale_id: Uuid) -> CoreResult<()> {
    if item.sale_id() != sale_id {
        return Err(CoreError::not_found(EntityKind::SaleItem, item.id()));
    }
    Ok(())
}

/// Narrows a validated command quantity to the entity type.
fn to_quantity(quantity: i64) -> CoreResult<u32> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into());
    }
    u32::try_from(quantity).map_err(|_| CoreError::QuantityLimitExceeded {
        requested: u32::MAX,
        max: MAX_ITEM_QUANTITY,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::SaleStatus;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn input(qty: i64, price: Decimal) -> SaleItemInput {
        SaleItemInput {
            id: None,
            product_id: Uuid::new_v4(),
            quantity: qty,
            unit_price: price,
            discount: Decimal::ZERO,
        }
    }

    fn create_cmd(items: Vec<SaleItemInput>) -> CreateSale {
        CreateSale {
            sale_number: " 1001 ".to_string(),
            sale_date: Utc::now() - Duration::hours(2),
            branch_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            items,
        }
    }

    fn update_cmd(sale: &Sale, items: Vec<SaleItemInput>) -> UpdateSale {
        UpdateSale {
            id: sale.id(),
            sale_number: sale.sale_number().to_string(),
            sale_date: sale.sale_date(),
            branch_id: sale.branch_id(),
            customer_id: sale.customer_id(),
            status: SaleStatus::Active,
            items,
        }
    }

    fn item_update(item: &SaleItem, qty: i64, status: SaleItemStatus) -> UpdateSaleItem {
        UpdateSaleItem {
            id: item.id(),
            sale_id: item.sale_id(),
            product_id: item.product_id(),
            quantity: qty,
            unit_price: item.unit_price().amount(),
            discount: Decimal::ZERO,
            status,
        }
    }

    #[test]
    fn test_build_sale_example_total() {
        let policy = SalesPolicy::default();
        let cmd = create_cmd(vec![input(5, dec!(100)), input(1, dec!(50))]);
        policy.check_create_sale(&cmd, Utc::now()).unwrap();

        let (sale, event) = policy.build_sale(Uuid::new_v4(), &cmd).unwrap();
        assert_eq!(sale.sale_number(), "1001");
        assert_eq!(event.sale_number, "1001");
        assert_eq!(sale.total(), Money::new(dec!(500)));
    }

    #[test]
    fn test_build_sale_rejects_25_units() {
        let policy = SalesPolicy::default();
        let cmd = create_cmd(vec![input(25, dec!(1))]);
        policy.check_create_sale(&cmd, Utc::now()).unwrap();
        let err = policy.build_sale(Uuid::new_v4(), &cmd).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainInvariant);
        assert_eq!(err.field(), Some("quantity"));
    }

    #[test]
    fn test_oversized_unit_price_is_an_error_not_a_panic() {
        let policy = SalesPolicy::default();
        let cmd = create_cmd(vec![input(10, dec!(10000000000000000000000000))]);

        let err = policy.check_create_sale(&cmd, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field(), Some("items[0].unit_price"));

        // pricing refuses it on its own too
        let err = policy.build_sale(Uuid::new_v4(), &cmd).unwrap_err();
        assert_eq!(err.field(), Some("unit_price"));
    }

    #[test]
    fn test_update_item_with_extreme_amounts_fails_validation() {
        let policy = SalesPolicy::default();
        let (sale, _) = policy
            .build_sale(Uuid::new_v4(), &create_cmd(vec![input(1, dec!(10))]))
            .unwrap();
        let mut cmd = item_update(&sale.items()[0], i64::MAX, SaleItemStatus::Active);
        cmd.unit_price = dec!(100000000000);

        let err = policy.check_update_sale_item(&cmd).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.field(), Some("unit_price"));
    }

    #[test]
    fn test_check_returns_validation_kind() {
        let policy = SalesPolicy::default();
        let err = policy.check_create_sale(&create_cmd(vec![]), Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_revise_sale_updates_existing_and_adds_new() {
        let policy = SalesPolicy::default();
        let (mut sale, _) = policy
            .build_sale(Uuid::new_v4(), &create_cmd(vec![input(1, dec!(10))]))
            .unwrap();
        let existing = sale.items()[0].id();

        let mut keep = input(4, dec!(10));
        keep.id = Some(existing);
        let cmd = update_cmd(&sale, vec![keep, input(10, dec!(1))]);

        let events = policy.revise_sale(&mut sale, &cmd, Utc::now()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(sale.items().len(), 2);
        assert_eq!(sale.item(existing).unwrap().discount(), Money::new(dec!(4)));
        assert_eq!(sale.total(), Money::new(dec!(36)) + Money::new(dec!(8)));
    }

    #[test]
    fn test_revise_sale_unknown_item_id() {
        let policy = SalesPolicy::default();
        let (mut sale, _) = policy
            .build_sale(Uuid::new_v4(), &create_cmd(vec![input(1, dec!(10))]))
            .unwrap();
        let mut ghost = input(1, dec!(1));
        ghost.id = Some(Uuid::new_v4());
        let cmd = update_cmd(&sale, vec![ghost]);

        let err = policy.revise_sale(&mut sale, &cmd, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_build_item_prices_and_attaches() {
        let policy = SalesPolicy::default();
        let (sale, _) = policy
            .build_sale(Uuid::new_v4(), &create_cmd(vec![input(1, dec!(10))]))
            .unwrap();
        let cmd = CreateSaleItem {
            sale_id: sale.id(),
            product_id: Uuid::new_v4(),
            quantity: 10,
            unit_price: dec!(5),
            discount: Decimal::ZERO,
        };

        let item = policy.build_item(&sale, &cmd).unwrap();
        assert_eq!(item.sale_id(), sale.id());
        assert_eq!(item.discount(), Money::new(dec!(10)));
    }

    #[test]
    fn test_build_item_on_cancelled_sale() {
        let policy = SalesPolicy::default();
        let (mut sale, _) = policy
            .build_sale(Uuid::new_v4(), &create_cmd(vec![input(1, dec!(10))]))
            .unwrap();
        sale.cancel(Utc::now()).unwrap();
        let cmd = CreateSaleItem {
            sale_id: sale.id(),
            product_id: Uuid::new_v4(),
            quantity: 1,
            unit_price: dec!(5),
            discount: Decimal::ZERO,
        };
        assert_eq!(policy.build_item(&sale, &cmd).unwrap_err().kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_revise_item_then_cancel() {
        let policy = SalesPolicy::default();
        let (sale, _) = policy
            .build_sale(Uuid::new_v4(), &create_cmd(vec![input(1, dec!(10))]))
            .unwrap();
        let mut item = sale.items()[0].clone();

        let cmd = item_update(&item, 4, SaleItemStatus::Active);
        let events = policy.revise_item(&mut item, &sale, &cmd, Utc::now()).unwrap();
        assert!(events.is_empty());
        assert_eq!(item.discount(), Money::new(dec!(4)));

        let cmd = item_update(&item, 4, SaleItemStatus::Canceled);
        let events = policy.revise_item(&mut item, &sale, &cmd, Utc::now()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "SaleItemCanceled");
        assert_eq!(item.status(), SaleItemStatus::Canceled);

        let cmd = item_update(&item, 4, SaleItemStatus::Active);
        let err = policy.revise_item(&mut item, &sale, &cmd, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_revise_item_over_limit_leaves_item() {
        let policy = SalesPolicy::default();
        let (sale, _) = policy
            .build_sale(Uuid::new_v4(), &create_cmd(vec![input(1, dec!(10))]))
            .unwrap();
        let mut item = sale.items()[0].clone();
        let before = item.clone();

        let cmd = item_update(&item, 30, SaleItemStatus::Canceled);
        let err = policy.revise_item(&mut item, &sale, &cmd, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DomainInvariant);
        assert_eq!(item, before);
    }

    #[test]
    fn test_item_of_other_sale_is_not_found() {
        let policy = SalesPolicy::default();
        let (sale_a, _) = policy
            .build_sale(Uuid::new_v4(), &create_cmd(vec![input(1, dec!(10))]))
            .unwrap();
        let (sale_b, _) = policy
            .build_sale(Uuid::new_v4(), &create_cmd(vec![input(1, dec!(10))]))
            .unwrap();
        let mut item = sale_a.items()[0].clone();

        let err = policy.cancel_item(&mut item, &sale_b, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(policy.remove_item(&item, &sale_a, Utc::now()).is_ok());
    }

    #[test]
    fn test_page_request() {
        let policy = SalesPolicy::default();
        let page = policy
            .page_request(&ListSales { page_number: 2, page_size: 10 })
            .unwrap();
        assert_eq!(page.offset(), 10);
        assert!(policy.page_request(&ListSales { page_number: 0, page_size: 10 }).is_err());
    }
}
