//! Raw material, purchase and usage handlers
//!
//! Every purchase or usage write recomputes the material's cached stock
//! before the response is sent.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::{Material, MaterialPurchase, MaterialUsage};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::FactoryContext;
use crate::services::material::{
    CreateMaterialInput, CreatePurchaseInput, CreateUsageInput, InventoryValuation, MovementQuery,
    UpdateMaterialInput, UpdatePurchaseInput, UpdateUsageInput,
};
use crate::services::MaterialService;
use crate::AppState;

// ----------------------------------------------------------------------------
// Materials
// ----------------------------------------------------------------------------

pub async fn list_materials(
    State(state): State<AppState>,
    ctx: FactoryContext,
) -> AppResult<Json<Vec<Material>>> {
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.list_materials(ctx.factory_id()).await?))
}

pub async fn get_material(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<Material>> {
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.get_material(ctx.factory_id(), material_id).await?))
}

pub async fn create_material(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreateMaterialInput>,
) -> AppResult<(StatusCode, Json<Material>)> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    let material = service.create_material(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

pub async fn update_material(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(material_id): Path<Uuid>,
    Json(input): Json<UpdateMaterialInput>,
) -> AppResult<Json<Material>> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.update_material(ctx.factory_id(), material_id, input).await?))
}

pub async fn delete_material(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(material_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    service.delete_material(ctx.factory_id(), material_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Force a full stock recompute from purchase and usage history
pub async fn recompute_material(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<Material>> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.recompute(ctx.factory_id(), material_id).await?))
}

pub async fn inventory_valuation(
    State(state): State<AppState>,
    ctx: FactoryContext,
) -> AppResult<Json<InventoryValuation>> {
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.valuation(ctx.factory_id()).await?))
}

// ----------------------------------------------------------------------------
// Purchases
// ----------------------------------------------------------------------------

pub async fn list_purchases(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<MaterialPurchase>>> {
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.list_purchases(ctx.factory_id(), &query).await?))
}

pub async fn get_purchase(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<MaterialPurchase>> {
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.get_purchase(ctx.factory_id(), purchase_id).await?))
}

pub async fn create_purchase(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreatePurchaseInput>,
) -> AppResult<(StatusCode, Json<MaterialPurchase>)> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    let purchase = service.create_purchase(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn update_purchase(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(purchase_id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseInput>,
) -> AppResult<Json<MaterialPurchase>> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.update_purchase(ctx.factory_id(), purchase_id, input).await?))
}

pub async fn delete_purchase(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    service.delete_purchase(ctx.factory_id(), purchase_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ----------------------------------------------------------------------------
// Usage
// ----------------------------------------------------------------------------

pub async fn list_usage(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<MaterialUsage>>> {
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.list_usage(ctx.factory_id(), &query).await?))
}

pub async fn get_usage(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(usage_id): Path<Uuid>,
) -> AppResult<Json<MaterialUsage>> {
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.get_usage(ctx.factory_id(), usage_id).await?))
}

pub async fn create_usage(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreateUsageInput>,
) -> AppResult<(StatusCode, Json<MaterialUsage>)> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    let usage = service.create_usage(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(usage)))
}

pub async fn update_usage(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(usage_id): Path<Uuid>,
    Json(input): Json<UpdateUsageInput>,
) -> AppResult<Json<MaterialUsage>> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    Ok(Json(service.update_usage(ctx.factory_id(), usage_id, input).await?))
}

pub async fn delete_usage(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(usage_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = MaterialService::new(state.db.clone());
    service.delete_usage(ctx.factory_id(), usage_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
