//! Sales, customer payment and receivables handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::ledger::{CustomerFilter, CustomerStatement};
use shared::models::{CustomerSummary, Sale};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::FactoryContext;
use crate::services::sale::{
    CreateSaleInput, PaymentApplied, RecordPaymentInput, SaleCreated, SaleQuery, UpdateSaleInput,
};
use crate::services::SaleService;
use crate::AppState;

pub async fn list_sales(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(query): Query<SaleQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    let service = SaleService::new(state.db.clone());
    Ok(Json(service.list_sales(ctx.factory_id(), &query).await?))
}

pub async fn get_sale(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(sale_id): Path<Uuid>,
) -> AppResult<Json<Sale>> {
    let service = SaleService::new(state.db.clone());
    Ok(Json(service.get_sale(ctx.factory_id(), sale_id).await?))
}

/// Record a sale; money received beyond its total settles older invoices
pub async fn create_sale(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<(StatusCode, Json<SaleCreated>)> {
    ctx.require_active()?;
    let service = SaleService::new(state.db.clone());
    let created = service.create_sale(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_sale(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(sale_id): Path<Uuid>,
    Json(input): Json<UpdateSaleInput>,
) -> AppResult<Json<Sale>> {
    ctx.require_active()?;
    let service = SaleService::new(state.db.clone());
    Ok(Json(service.update_sale(ctx.factory_id(), sale_id, input).await?))
}

pub async fn delete_sale(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(sale_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = SaleService::new(state.db.clone());
    service.delete_sale(ctx.factory_id(), sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Spread a customer payment over their open invoices, oldest first
pub async fn record_customer_payment(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<RecordPaymentInput>,
) -> AppResult<Json<PaymentApplied>> {
    ctx.require_active()?;
    let service = SaleService::new(state.db.clone());
    Ok(Json(service.apply_payment(ctx.factory_id(), input).await?))
}

pub async fn customer_ledger(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(filter): Query<CustomerFilter>,
) -> AppResult<Json<Vec<CustomerSummary>>> {
    let service = SaleService::new(state.db.clone());
    Ok(Json(service.customers(ctx.factory_id(), &filter).await?))
}

pub async fn customer_statement(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(customer_name): Path<String>,
) -> AppResult<Json<CustomerStatement>> {
    let service = SaleService::new(state.db.clone());
    Ok(Json(service.statement(ctx.factory_id(), &customer_name).await?))
}
