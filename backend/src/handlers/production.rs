//! Product definition and production log handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::{ProductDefinition, ProductionLog};
use shared::types::DateFilter;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::FactoryContext;
use crate::services::production::{
    CreateProductInput, CreateProductionInput, UpdateProductInput, UpdateProductionInput,
};
use crate::services::ProductionService;
use crate::AppState;

pub async fn list_products(
    State(state): State<AppState>,
    ctx: FactoryContext,
) -> AppResult<Json<Vec<ProductDefinition>>> {
    let service = ProductionService::new(state.db.clone());
    Ok(Json(service.list_products(ctx.factory_id()).await?))
}

pub async fn get_product(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductDefinition>> {
    let service = ProductionService::new(state.db.clone());
    Ok(Json(service.get_product(ctx.factory_id(), product_id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreateProductInput>,
) -> AppResult<(StatusCode, Json<ProductDefinition>)> {
    ctx.require_active()?;
    let service = ProductionService::new(state.db.clone());
    let product = service.create_product(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(product_id): Path<Uuid>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductDefinition>> {
    ctx.require_active()?;
    let service = ProductionService::new(state.db.clone());
    Ok(Json(service.update_product(ctx.factory_id(), product_id, input).await?))
}

pub async fn delete_product(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(product_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = ProductionService::new(state.db.clone());
    service.delete_product(ctx.factory_id(), product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_production(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(dates): Query<DateFilter>,
) -> AppResult<Json<Vec<ProductionLog>>> {
    let service = ProductionService::new(state.db.clone());
    Ok(Json(service.list_logs(ctx.factory_id(), &dates).await?))
}

pub async fn get_production(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(log_id): Path<Uuid>,
) -> AppResult<Json<ProductionLog>> {
    let service = ProductionService::new(state.db.clone());
    Ok(Json(service.get_log(ctx.factory_id(), log_id).await?))
}

pub async fn create_production(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreateProductionInput>,
) -> AppResult<(StatusCode, Json<ProductionLog>)> {
    ctx.require_active()?;
    let service = ProductionService::new(state.db.clone());
    let log = service.create_log(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn update_production(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(log_id): Path<Uuid>,
    Json(input): Json<UpdateProductionInput>,
) -> AppResult<Json<ProductionLog>> {
    ctx.require_active()?;
    let service = ProductionService::new(state.db.clone());
    Ok(Json(service.update_log(ctx.factory_id(), log_id, input).await?))
}

pub async fn delete_production(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(log_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = ProductionService::new(state.db.clone());
    service.delete_log(ctx.factory_id(), log_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
