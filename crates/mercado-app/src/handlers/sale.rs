//! # Sale Handlers

use chrono::Utc;
use mercado_core::commands::{CreateSale, ListSales, UpdateSale};
use mercado_core::{CoreError, EntityKind, Sale, SaleEvent};
use mercado_db::{Include, Repository};
use tracing::{debug, info};
use uuid::Uuid;

use super::load_sale;
use crate::cancel::CancelToken;
use crate::error::{AppError, AppResult};
use crate::publisher::publish_all;
use crate::results::{DeleteResult, SaleListResult, SaleResult};
use crate::state::AppState;

const WITH_ITEMS: &[Include] = &[Include::SaleItems];

/// Validates, prices and stores a new sale, then announces `SaleCreated`.
pub async fn create_sale(state: &AppState, cmd: CreateSale, cancel: &CancelToken) -> AppResult<SaleResult> {
    debug!(sale_number = %cmd.sale_number, items = cmd.items.len(), "create_sale command");
    cancel.check()?;

    state.policy.check_create_sale(&cmd, Utc::now())?;
    let (sale, created) = state.policy.build_sale(Uuid::new_v4(), &cmd)?;

    let saved = cancel
        .run(async {
            state
                .sales
                .create(&sale)
                .await
                .map_err(|e| AppError::from_sale_write(e, sale.sale_number()))
        })
        .await?;

    publish_all(state.publisher.as_ref(), &[created.into()]).await;

    info!(
        sale_id = %saved.id(),
        sale_number = %saved.sale_number(),
        total = %saved.total(),
        items = saved.items().len(),
        "Sale created"
    );
    Ok(SaleResult::from(&saved))
}

pub async fn get_sale(state: &AppState, id: Uuid, cancel: &CancelToken) -> AppResult<SaleResult> {
    debug!(sale_id = %id, "get_sale command");
    cancel.check()?;
    state.policy.check_id(id)?;

    let sale = load_sale(state, id, WITH_ITEMS, cancel).await?;
    Ok(SaleResult::from(&sale))
}

/// Replaces header fields and the active item list of an open sale.
pub async fn update_sale(state: &AppState, cmd: UpdateSale, cancel: &CancelToken) -> AppResult<SaleResult> {
    debug!(sale_id = %cmd.id, items = cmd.items.len(), "update_sale command");
    cancel.check()?;

    let now = Utc::now();
    state.policy.check_update_sale(&cmd, now)?;

    let mut sale = load_sale(state, cmd.id, WITH_ITEMS, cancel).await?;
    let events = state.policy.revise_sale(&mut sale, &cmd, now)?;

    let saved = cancel
        .run(async {
            state
                .sales
                .update(&sale)
                .await
                .map_err(|e| AppError::from_sale_write(e, sale.sale_number()))
        })
        .await?
        .ok_or_else(|| CoreError::not_found(EntityKind::Sale, cmd.id))?;

    publish_all(state.publisher.as_ref(), &events).await;

    info!(
        sale_id = %saved.id(),
        status = %saved.status(),
        total = %saved.total(),
        "Sale updated"
    );
    Ok(SaleResult::from(&saved))
}

/// Removes a sale and its items. No event is published.
pub async fn delete_sale(state: &AppState, id: Uuid, cancel: &CancelToken) -> AppResult<DeleteResult> {
    debug!(sale_id = %id, "delete_sale command");
    cancel.check()?;
    state.policy.check_id(id)?;

    let deleted = cancel.run(state.sales.delete(id)).await?;
    if !deleted {
        return Err(CoreError::not_found(EntityKind::Sale, id).into());
    }

    info!(sale_id = %id, "Sale deleted");
    Ok(DeleteResult { success: true })
}

/// One page of sales of every status, newest first.
pub async fn list_sales(state: &AppState, cmd: ListSales, cancel: &CancelToken) -> AppResult<SaleListResult> {
    debug!(page = cmd.page_number, size = cmd.page_size, "list_sales command");
    cancel.check()?;

    let page = state.policy.page_request(&cmd)?;
    let sales = cancel.run(state.sales.list_page(page, WITH_ITEMS)).await?;

    Ok(SaleListResult::from(sales))
}

pub async fn cancel_sale(state: &AppState, id: Uuid, cancel: &CancelToken) -> AppResult<SaleResult> {
    debug!(sale_id = %id, "cancel_sale command");
    cancel.check()?;
    state.policy.check_id(id)?;

    let mut sale = load_sale(state, id, WITH_ITEMS, cancel).await?;
    let canceled = sale.cancel(Utc::now())?;

    let saved = persist_status(state, &sale, cancel).await?;
    publish_all(state.publisher.as_ref(), &[canceled.into()]).await;

    info!(sale_id = %id, sale_number = %saved.sale_number(), "Sale cancelled");
    Ok(SaleResult::from(&saved))
}

pub async fn complete_sale(state: &AppState, id: Uuid, cancel: &CancelToken) -> AppResult<SaleResult> {
    debug!(sale_id = %id, "complete_sale command");
    cancel.check()?;
    state.policy.check_id(id)?;

    let mut sale = load_sale(state, id, WITH_ITEMS, cancel).await?;
    let modified = sale.complete(Utc::now())?;

    let saved = persist_status(state, &sale, cancel).await?;
    publish_all(state.publisher.as_ref(), &[SaleEvent::from(modified)]).await;

    info!(sale_id = %id, total = %saved.total(), "Sale completed");
    Ok(SaleResult::from(&saved))
}

async fn persist_status(state: &AppState, sale: &Sale, cancel: &CancelToken) -> AppResult<Sale> {
    cancel
        .run(state.sales.update(sale))
        .await?
        .ok_or_else(|| AppError::from(CoreError::not_found(EntityKind::Sale, sale.id())))
}
