//! # Sale Item Handlers
//!
//! Single-line operations. The parent sale is loaded only for its status
//! guard; lines are priced and stored on their own.

use chrono::Utc;
use mercado_core::commands::{CreateSaleItem, UpdateSaleItem};
use mercado_core::{CoreError, EntityKind, SaleItem};
use mercado_db::Repository;
use tracing::{debug, info};
use uuid::Uuid;

use super::{load_sale, load_sale_item};
use crate::cancel::CancelToken;
use crate::error::{AppError, AppResult};
use crate::publisher::publish_all;
use crate::results::{DeleteResult, SaleItemResult};
use crate::state::AppState;

/// Adds one priced line to an open sale. No event is published.
pub async fn create_sale_item(state: &AppState, cmd: CreateSaleItem, cancel: &CancelToken) -> AppResult<SaleItemResult> {
    debug!(sale_id = %cmd.sale_id, quantity = cmd.quantity, "create_sale_item command");
    cancel.check()?;

    state.policy.check_create_sale_item(&cmd)?;
    let sale = load_sale(state, cmd.sale_id, &[], cancel).await?;
    let item = state.policy.build_item(&sale, &cmd)?;

    let saved = cancel.run(state.sale_items.create(&item)).await?;

    info!(
        item_id = %saved.id(),
        sale_id = %saved.sale_id(),
        quantity = saved.quantity(),
        discount = %saved.discount(),
        "Sale item created"
    );
    Ok(SaleItemResult::from(&saved))
}

pub async fn get_sale_item(state: &AppState, id: Uuid, cancel: &CancelToken) -> AppResult<SaleItemResult> {
    debug!(item_id = %id, "get_sale_item command");
    cancel.check()?;
    state.policy.check_id(id)?;

    let item = load_sale_item(state, id, cancel).await?;
    Ok(SaleItemResult::from(&item))
}

/// Revises a line; a `canceled` status in the command also cancels it.
pub async fn update_sale_item(state: &AppState, cmd: UpdateSaleItem, cancel: &CancelToken) -> AppResult<SaleItemResult> {
    debug!(item_id = %cmd.id, sale_id = %cmd.sale_id, status = %cmd.status, "update_sale_item command");
    cancel.check()?;

    state.policy.check_update_sale_item(&cmd)?;
    let mut item = load_sale_item(state, cmd.id, cancel).await?;
    let sale = load_sale(state, cmd.sale_id, &[], cancel).await?;

    let events = state.policy.revise_item(&mut item, &sale, &cmd, Utc::now())?;
    let saved = persist_item(state, &item, cancel).await?;

    publish_all(state.publisher.as_ref(), &events).await;

    info!(
        item_id = %saved.id(),
        status = %saved.status(),
        total = %saved.total(),
        "Sale item updated"
    );
    Ok(SaleItemResult::from(&saved))
}

pub async fn cancel_sale_item(state: &AppState, id: Uuid, cancel: &CancelToken) -> AppResult<SaleItemResult> {
    debug!(item_id = %id, "cancel_sale_item command");
    cancel.check()?;
    state.policy.check_id(id)?;

    let mut item = load_sale_item(state, id, cancel).await?;
    let sale = load_sale(state, item.sale_id(), &[], cancel).await?;

    let canceled = state.policy.cancel_item(&mut item, &sale, Utc::now())?;
    let saved = persist_item(state, &item, cancel).await?;

    publish_all(state.publisher.as_ref(), &[canceled.into()]).await;

    info!(item_id = %id, sale_id = %saved.sale_id(), "Sale item cancelled");
    Ok(SaleItemResult::from(&saved))
}

/// Removes a line. Published as `SaleItemCanceled`.
pub async fn delete_sale_item(state: &AppState, id: Uuid, cancel: &CancelToken) -> AppResult<DeleteResult> {
    debug!(item_id = %id, "delete_sale_item command");
    cancel.check()?;
    state.policy.check_id(id)?;

    let item = load_sale_item(state, id, cancel).await?;
    let sale = load_sale(state, item.sale_id(), &[], cancel).await?;
    let canceled = state.policy.remove_item(&item, &sale, Utc::now())?;

    let deleted = cancel.run(state.sale_items.delete(id)).await?;
    if !deleted {
        return Err(CoreError::not_found(EntityKind::SaleItem, id).into());
    }

    publish_all(state.publisher.as_ref(), &[canceled.into()]).await;

    info!(item_id = %id, sale_id = %item.sale_id(), "Sale item deleted");
    Ok(DeleteResult { success: true })
}

async fn persist_item(state: &AppState, item: &SaleItem, cancel: &CancelToken) -> AppResult<SaleItem> {
    cancel
        .run(state.sale_items.update(item))
        .await?
        .ok_or_else(|| AppError::from(CoreError::not_found(EntityKind::SaleItem, item.id())))
}
