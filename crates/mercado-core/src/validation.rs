//! # Validation Module
//!
//! Declarative rules for sale and sale item commands.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Rule Pipeline                                      │
//! │                                                                         │
//! │  command ──► rule 1 ──► rule 2 ──► ... ──► rule N                      │
//! │                │           │                  │                         │
//! │                └───────────┴──── collect ─────┘                         │
//! │                                     │                                   │
//! │                      empty? ──► Ok(())                                  │
//! │                      else   ──► Err(ValidationErrors) (all of them)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule is a pure function returning `ValidationResult<()>`. Pipelines
//! never short-circuit, so callers see every failure of a command at once.
//!
//! ## Configurable Rules
//! - Sale number: non-empty (default on), numeric-only (default off)
//! - Item discount bound: `UnitPrice` on create, `LineSubtotal` on update
//! - Discount floor ("below 4 units cannot have a discount"): default off

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::commands::{CreateSale, CreateSaleItem, ListSales, SaleItemInput, UpdateSale, UpdateSaleItem};
use crate::error::{ValidationError, ValidationErrors, ValidationResult};
use crate::pricing::{MAX_ITEM_QUANTITY, MAX_UNIT_PRICE, MIN_DISCOUNT_QUANTITY};
use crate::types::SaleStatus;

/// Longest accepted sale number.
pub const MAX_SALE_NUMBER_LEN: usize = 50;

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleNumberRules {
    pub require_non_empty: bool,
    pub require_numeric: bool,
}

impl Default for SaleNumberRules {
    fn default() -> Self {
        Self {
            require_non_empty: true,
            require_numeric: false,
        }
    }
}

/// Upper bound for a caller-supplied item discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountBound {
    /// `0 ≤ discount ≤ unit price`
    UnitPrice,
    /// `0 ≤ discount ≤ unit price × quantity`
    LineSubtotal,
}

impl DiscountBound {
    /// `None` when the bound itself does not fit in a `Decimal`.
    pub fn limit(&self, unit_price: Decimal, quantity: i64) -> Option<Decimal> {
        match self {
            DiscountBound::UnitPrice => Some(unit_price),
            DiscountBound::LineSubtotal => unit_price.checked_mul(Decimal::from(quantity)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub sale_number: SaleNumberRules,
    /// Applies to items of CreateSale and to CreateSaleItem.
    pub item_discount_on_create: DiscountBound,
    /// Applies to items of UpdateSale and to UpdateSaleItem.
    pub item_discount_on_update: DiscountBound,
    /// Reject a nonzero discount on lines below the first discount tier.
    pub reject_discount_below_tier: bool,
    pub max_page_size: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            sale_number: SaleNumberRules::default(),
            item_discount_on_create: DiscountBound::UnitPrice,
            item_discount_on_update: DiscountBound::LineSubtotal,
            reject_discount_below_tier: false,
            max_page_size: 100,
        }
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Validates a sale number against the configured rules.
///
/// ```rust
/// use mercado_core::validation::{validate_sale_number, SaleNumberRules};
///
/// let lenient = SaleNumberRules::default();
/// let numeric = SaleNumberRules { require_numeric: true, ..lenient };
///
/// assert!(validate_sale_number("ABC123", &lenient, "sale_number").is_ok());
/// assert!(validate_sale_number("ABC123", &numeric, "sale_number").is_err());
/// assert!(validate_sale_number("", &lenient, "sale_number").is_err());
/// ```
pub fn validate_sale_number(value: &str, rules: &SaleNumberRules, field: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        if rules.require_non_empty {
            return Err(ValidationError::Required { field: field.to_string() });
        }
        return Ok(());
    }

    if value.len() > MAX_SALE_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_SALE_NUMBER_LEN,
        });
    }

    if rules.require_numeric && !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Sale dates may not lie after `now`.
pub fn validate_sale_date(date: DateTime<Utc>, now: DateTime<Utc>, field: &str) -> ValidationResult<()> {
    if date > now {
        return Err(ValidationError::InFuture { field: field.to_string() });
    }
    Ok(())
}

/// The nil uuid counts as "not provided".
pub fn validate_required_id(id: Uuid, field: &str) -> ValidationResult<()> {
    if id.is_nil() {
        return Err(ValidationError::Required { field: field.to_string() });
    }
    Ok(())
}

pub fn validate_quantity_positive(quantity: i64, field: &str) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive { field: field.to_string() });
    }
    Ok(())
}

pub fn validate_quantity_at_most_max(quantity: i64, field: &str) -> ValidationResult<()> {
    if quantity > i64::from(MAX_ITEM_QUANTITY) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "1".to_string(),
            max: MAX_ITEM_QUANTITY.to_string(),
        });
    }
    Ok(())
}

/// Unit prices must lie in `(0, MAX_UNIT_PRICE]`.
pub fn validate_unit_price(unit_price: Decimal, field: &str) -> ValidationResult<()> {
    if unit_price <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive { field: field.to_string() });
    }
    if unit_price > MAX_UNIT_PRICE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: "0".to_string(),
            max: MAX_UNIT_PRICE.to_string(),
        });
    }
    Ok(())
}

/// Checks `0 ≤ discount ≤ bound`.
///
/// The upper bound is only checked once quantity and price are themselves
/// positive; otherwise the other rules already fail. A bound too large for a
/// `Decimal` cannot be exceeded.
pub fn validate_discount(
    discount: Decimal,
    unit_price: Decimal,
    quantity: i64,
    bound: DiscountBound,
    field: &str,
) -> ValidationResult<()> {
    let out_of_range = |max: String| ValidationError::OutOfRange {
        field: field.to_string(),
        min: "0".to_string(),
        max,
    };

    let limit = if quantity > 0 && unit_price > Decimal::ZERO {
        bound.limit(unit_price, quantity)
    } else {
        None
    };

    if discount < Decimal::ZERO {
        let max = limit.unwrap_or(Decimal::MAX);
        return Err(out_of_range(max.normalize().to_string()));
    }
    if let Some(limit) = limit {
        if discount > limit {
            return Err(out_of_range(limit.normalize().to_string()));
        }
    }
    Ok(())
}

/// Lines below the first tier may not carry a discount.
pub fn validate_discount_floor(quantity: i64, discount: Decimal, field: &str) -> ValidationResult<()> {
    if quantity > 0 && quantity < i64::from(MIN_DISCOUNT_QUANTITY) && discount > Decimal::ZERO {
        return Err(ValidationError::Rule {
            field: field.to_string(),
            message: format!("purchases below {MIN_DISCOUNT_QUANTITY} items cannot have a discount"),
        });
    }
    Ok(())
}

/// Generic updates may not cancel; cancellation has its own operation.
pub fn validate_update_status(status: SaleStatus, field: &str) -> ValidationResult<()> {
    if status == SaleStatus::Canceled {
        return Err(ValidationError::NotAllowed {
            field: field.to_string(),
            allowed: vec![
                SaleStatus::Active.to_string(),
                SaleStatus::Completed.to_string(),
            ],
        });
    }
    Ok(())
}

// =============================================================================
// Pipelines
// =============================================================================

pub fn validate_create_sale(
    cmd: &CreateSale,
    config: &ValidationConfig,
    now: DateTime<Utc>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(validate_sale_number(&cmd.sale_number, &config.sale_number, "sale_number"));
    errors.check(validate_sale_date(cmd.sale_date, now, "sale_date"));
    errors.check(validate_required_id(cmd.branch_id, "branch_id"));
    errors.check(validate_required_id(cmd.customer_id, "customer_id"));

    if cmd.items.is_empty() {
        errors.push(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    for (index, item) in cmd.items.iter().enumerate() {
        check_item_input(&mut errors, item, index, config.item_discount_on_create, false, config);
    }

    errors.into_result()
}

pub fn validate_update_sale(
    cmd: &UpdateSale,
    config: &ValidationConfig,
    now: DateTime<Utc>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(validate_required_id(cmd.id, "id"));
    errors.check(validate_sale_number(&cmd.sale_number, &config.sale_number, "sale_number"));
    errors.check(validate_sale_date(cmd.sale_date, now, "sale_date"));
    errors.check(validate_required_id(cmd.branch_id, "branch_id"));
    errors.check(validate_required_id(cmd.customer_id, "customer_id"));
    errors.check(validate_update_status(cmd.status, "status"));

    if cmd.items.is_empty() {
        errors.push(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    for (index, item) in cmd.items.iter().enumerate() {
        check_item_input(&mut errors, item, index, config.item_discount_on_update, true, config);

        if let Some(id) = item.id {
            let repeated = cmd.items[..index].iter().any(|other| other.id == Some(id));
            if repeated {
                errors.push(ValidationError::Rule {
                    field: format!("items[{index}].id"),
                    message: "appears more than once".to_string(),
                });
            }
        }
    }

    errors.into_result()
}

pub fn validate_create_sale_item(cmd: &CreateSaleItem, config: &ValidationConfig) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(validate_required_id(cmd.sale_id, "sale_id"));
    errors.check(validate_required_id(cmd.product_id, "product_id"));
    errors.check(validate_quantity_positive(cmd.quantity, "quantity"));
    errors.check(validate_unit_price(cmd.unit_price, "unit_price"));
    errors.check(validate_discount(
        cmd.discount,
        cmd.unit_price,
        cmd.quantity,
        config.item_discount_on_create,
        "discount",
    ));
    if config.reject_discount_below_tier {
        errors.check(validate_discount_floor(cmd.quantity, cmd.discount, "discount"));
    }

    errors.into_result()
}

pub fn validate_update_sale_item(cmd: &UpdateSaleItem, config: &ValidationConfig) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    errors.check(validate_required_id(cmd.id, "id"));
    errors.check(validate_required_id(cmd.sale_id, "sale_id"));
    errors.check(validate_required_id(cmd.product_id, "product_id"));
    errors.check(validate_quantity_positive(cmd.quantity, "quantity"));
    errors.check(validate_unit_price(cmd.unit_price, "unit_price"));
    errors.check(validate_discount(
        cmd.discount,
        cmd.unit_price,
        cmd.quantity,
        config.item_discount_on_update,
        "discount",
    ));
    if config.reject_discount_below_tier {
        errors.check(validate_discount_floor(cmd.quantity, cmd.discount, "discount"));
    }

    errors.into_result()
}

pub fn validate_list_sales(cmd: &ListSales, config: &ValidationConfig) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if cmd.page_number == 0 {
        errors.push(ValidationError::MustBePositive {
            field: "page_number".to_string(),
        });
    }
    if cmd.page_size == 0 {
        errors.push(ValidationError::MustBePositive {
            field: "page_size".to_string(),
        });
    } else if cmd.page_size > config.max_page_size {
        errors.push(ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: "1".to_string(),
            max: config.max_page_size.to_string(),
        });
    }

    errors.into_result()
}

/// For get/delete/cancel/complete commands that carry only an id.
pub fn validate_entity_id(id: Uuid) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(validate_required_id(id, "id"));
    errors.into_result()
}

fn check_item_input(
    errors: &mut ValidationErrors,
    item: &SaleItemInput,
    index: usize,
    bound: DiscountBound,
    is_update: bool,
    config: &ValidationConfig,
) {
    let field = |name: &str| format!("items[{index}].{name}");

    errors.check(validate_required_id(item.product_id, &field("product_id")));
    errors.check(validate_quantity_positive(item.quantity, &field("quantity")));
    if is_update {
        errors.check(validate_quantity_at_most_max(item.quantity, &field("quantity")));
    }
    errors.check(validate_unit_price(item.unit_price, &field("unit_price")));
    errors.check(validate_discount(
        item.discount,
        item.unit_price,
        item.quantity,
        bound,
        &field("discount"),
    ));
    if config.reject_discount_below_tier {
        errors.check(validate_discount_floor(item.quantity, item.discount, &field("discount")));
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn item(qty: i64, price: Decimal, discount: Decimal) -> SaleItemInput {
        SaleItemInput {
            id: None,
            product_id: Uuid::new_v4(),
            quantity: qty,
            unit_price: price,
            discount,
        }
    }

    fn create_cmd() -> CreateSale {
        CreateSale {
            sale_number: "1001".to_string(),
            sale_date: Utc::now() - Duration::minutes(5),
            branch_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            items: vec![item(5, dec!(10), dec!(0))],
        }
    }

    fn update_cmd() -> UpdateSale {
        let c = create_cmd();
        UpdateSale {
            id: Uuid::new_v4(),
            sale_number: c.sale_number,
            sale_date: c.sale_date,
            branch_id: c.branch_id,
            customer_id: c.customer_id,
            status: SaleStatus::Active,
            items: c.items,
        }
    }

    #[test]
    fn test_valid_create_passes() {
        assert!(validate_create_sale(&create_cmd(), &ValidationConfig::default(), Utc::now()).is_ok());
    }

    #[test]
    fn test_create_collects_every_failure() {
        let cmd = CreateSale {
            sale_number: "  ".to_string(),
            sale_date: Utc::now() + Duration::days(1),
            branch_id: Uuid::nil(),
            customer_id: Uuid::nil(),
            items: vec![item(0, dec!(-1), dec!(0))],
        };
        let errors = validate_create_sale(&cmd, &ValidationConfig::default(), Utc::now()).unwrap_err();

        for field in [
            "sale_number",
            "sale_date",
            "branch_id",
            "customer_id",
            "items[0].quantity",
            "items[0].unit_price",
        ] {
            assert!(errors.has_field(field), "missing error for {field}");
        }
        assert_eq!(errors.len(), 6);
    }

    #[test]
    fn test_create_requires_items() {
        let mut cmd = create_cmd();
        cmd.items.clear();
        let errors = validate_create_sale(&cmd, &ValidationConfig::default(), Utc::now()).unwrap_err();
        assert!(errors.has_field("items"));
    }

    #[test]
    fn test_create_does_not_cap_quantity() {
        // The over-limit check on create is the domain invariant, not a rule.
        let mut cmd = create_cmd();
        cmd.items = vec![item(25, dec!(1), dec!(0))];
        assert!(validate_create_sale(&cmd, &ValidationConfig::default(), Utc::now()).is_ok());
    }

    #[test]
    fn test_numeric_sale_number_mode() {
        let mut cmd = create_cmd();
        cmd.sale_number = "ABC123".to_string();

        let lenient = ValidationConfig::default();
        assert!(validate_create_sale(&cmd, &lenient, Utc::now()).is_ok());

        let strict = ValidationConfig {
            sale_number: SaleNumberRules {
                require_non_empty: true,
                require_numeric: true,
            },
            ..lenient
        };
        let errors = validate_create_sale(&cmd, &strict, Utc::now()).unwrap_err();
        assert!(errors.has_field("sale_number"));
    }

    #[test]
    fn test_sale_number_too_long() {
        let long = "9".repeat(MAX_SALE_NUMBER_LEN + 1);
        assert!(validate_sale_number(&long, &SaleNumberRules::default(), "n").is_err());
    }

    #[test]
    fn test_create_discount_bound_is_unit_price() {
        let mut cmd = create_cmd();
        cmd.items = vec![item(5, dec!(10), dec!(10))];
        assert!(validate_create_sale(&cmd, &ValidationConfig::default(), Utc::now()).is_ok());

        cmd.items = vec![item(5, dec!(10), dec!(10.01))];
        let errors = validate_create_sale(&cmd, &ValidationConfig::default(), Utc::now()).unwrap_err();
        assert!(errors.has_field("items[0].discount"));
    }

    #[test]
    fn test_update_discount_bound_is_line_subtotal() {
        let mut cmd = update_cmd();
        cmd.items = vec![item(5, dec!(10), dec!(50))];
        assert!(validate_update_sale(&cmd, &ValidationConfig::default(), Utc::now()).is_ok());

        cmd.items = vec![item(5, dec!(10), dec!(50.01))];
        assert!(validate_update_sale(&cmd, &ValidationConfig::default(), Utc::now()).is_err());
    }

    #[test]
    fn test_negative_discount_rejected() {
        let err = validate_discount(dec!(-1), dec!(10), 2, DiscountBound::LineSubtotal, "discount").unwrap_err();
        assert_eq!(err.field(), "discount");
    }

    #[test]
    fn test_update_rejects_cancel_status_and_big_quantity() {
        let mut cmd = update_cmd();
        cmd.status = SaleStatus::Canceled;
        cmd.items = vec![item(21, dec!(1), dec!(0))];
        let errors = validate_update_sale(&cmd, &ValidationConfig::default(), Utc::now()).unwrap_err();
        assert!(errors.has_field("status"));
        assert!(errors.has_field("items[0].quantity"));
    }

    #[test]
    fn test_update_rejects_repeated_item_ids() {
        let mut cmd = update_cmd();
        let id = Uuid::new_v4();
        let mut a = item(1, dec!(1), dec!(0));
        a.id = Some(id);
        let b = SaleItemInput { product_id: Uuid::new_v4(), ..a.clone() };
        cmd.items = vec![a, b];
        let errors = validate_update_sale(&cmd, &ValidationConfig::default(), Utc::now()).unwrap_err();
        assert!(errors.has_field("items[1].id"));
    }

    #[test]
    fn test_discount_floor_is_opt_in() {
        let mut cmd = update_cmd();
        cmd.items = vec![item(2, dec!(10), dec!(1))];
        let default = ValidationConfig::default();
        assert!(validate_update_sale(&cmd, &default, Utc::now()).is_ok());

        let strict = ValidationConfig {
            reject_discount_below_tier: true,
            ..default
        };
        let errors = validate_update_sale(&cmd, &strict, Utc::now()).unwrap_err();
        assert!(errors.has_field("items[0].discount"));
    }

    #[test]
    fn test_sale_item_commands() {
        let config = ValidationConfig::default();
        let create = CreateSaleItem {
            sale_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: 3,
            unit_price: dec!(2.50),
            discount: dec!(2.50),
        };
        assert!(validate_create_sale_item(&create, &config).is_ok());
        let too_much = CreateSaleItem { discount: dec!(2.51), ..create.clone() };
        assert!(validate_create_sale_item(&too_much, &config).is_err());

        let update = UpdateSaleItem {
            id: Uuid::nil(),
            sale_id: create.sale_id,
            product_id: create.product_id,
            quantity: 3,
            unit_price: dec!(2.50),
            discount: dec!(7.50),
            status: Default::default(),
        };
        let errors = validate_update_sale_item(&update, &config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.has_field("id"));
    }

    #[test]
    fn test_list_sales_paging() {
        let config = ValidationConfig::default();
        assert!(validate_list_sales(&ListSales { page_number: 2, page_size: 10 }, &config).is_ok());

        let errors = validate_list_sales(&ListSales { page_number: 0, page_size: 0 }, &config).unwrap_err();
        assert_eq!(errors.len(), 2);

        let errors = validate_list_sales(&ListSales { page_number: 1, page_size: 1000 }, &config).unwrap_err();
        assert!(errors.has_field("page_size"));
    }

    #[test]
    fn test_entity_id() {
        assert!(validate_entity_id(Uuid::new_v4()).is_ok());
        assert!(validate_entity_id(Uuid::nil()).is_err());
    }

    #[test]
    fn test_unit_price_ceiling() {
        assert!(validate_unit_price(MAX_UNIT_PRICE, "unit_price").is_ok());

        let err = validate_unit_price(MAX_UNIT_PRICE + dec!(0.01), "unit_price").unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref max, .. } if max == "1000000000"));

        let mut cmd = create_cmd();
        cmd.items = vec![item(10, dec!(10000000000000000000000000), dec!(0))];
        let errors = validate_create_sale(&cmd, &ValidationConfig::default(), Utc::now()).unwrap_err();
        assert!(errors.has_field("items[0].unit_price"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_discount_bound_too_large_to_represent() {
        assert_eq!(DiscountBound::LineSubtotal.limit(Decimal::MAX, 2), None);
        assert!(validate_discount(Decimal::MAX, Decimal::MAX, i64::MAX, DiscountBound::LineSubtotal, "d").is_ok());
        assert!(validate_discount(dec!(-1), Decimal::MAX, i64::MAX, DiscountBound::LineSubtotal, "d").is_err());
    }

    #[test]
    fn test_update_item_with_huge_quantity_reports_errors() {
        let cmd = UpdateSaleItem {
            id: Uuid::new_v4(),
            sale_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: i64::MAX,
            unit_price: dec!(100000000000),
            discount: Decimal::ZERO,
            status: Default::default(),
        };
        let errors = validate_update_sale_item(&cmd, &ValidationConfig::default()).unwrap_err();
        assert!(errors.has_field("unit_price"));

        let mut sale = update_cmd();
        sale.items = vec![item(i64::MAX, Decimal::MAX, Decimal::MAX)];
        let errors = validate_update_sale(&sale, &ValidationConfig::default(), Utc::now()).unwrap_err();
        assert!(errors.has_field("items[0].quantity"));
        assert!(errors.has_field("items[0].unit_price"));
    }

    fn any_decimal() -> impl Strategy<Value = Decimal> {
        (any::<u32>(), any::<u32>(), any::<u32>(), any::<bool>(), 0u32..=28)
            .prop_map(|(lo, mid, hi, negative, scale)| Decimal::from_parts(lo, mid, hi, negative, scale))
    }

    proptest! {
        #[test]
        fn item_pipelines_return_for_any_amounts(
            qty in any::<i64>(),
            price in any_decimal(),
            discount in any_decimal(),
        ) {
            let config = ValidationConfig::default();

            let mut create = create_cmd();
            create.items = vec![item(qty, price, discount)];
            let _ = validate_create_sale(&create, &config, Utc::now());

            let mut update = update_cmd();
            update.items = vec![item(qty, price, discount)];
            let _ = validate_update_sale(&update, &config, Utc::now());

            let single = UpdateSaleItem {
                id: Uuid::new_v4(),
                sale_id: Uuid::new_v4(),
                product_id: Uuid::new_v4(),
                quantity: qty,
                unit_price: price,
                discount,
                status: Default::default(),
            };
            let result = validate_update_sale_item(&single, &config);
            if price > MAX_UNIT_PRICE {
                prop_assert!(result.unwrap_err().has_field("unit_price"));
            }
        }

        #[test]
        fn line_subtotal_bound_accepts_everything_up_to_subtotal(
            qty in 1i64..=20,
            cents in 1i64..100_000,
            pct in 0u32..=100,
        ) {
            let price = Decimal::new(cents, 2);
            let subtotal = price * Decimal::from(qty);
            let discount = subtotal * Decimal::from(pct) / Decimal::from(100);
            prop_assert!(validate_discount(discount, price, qty, DiscountBound::LineSubtotal, "d").is_ok());
            prop_assert!(validate_discount(subtotal + Decimal::new(1, 2), price, qty, DiscountBound::LineSubtotal, "d").is_err());
        }
    }
}
