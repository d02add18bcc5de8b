//! Piece-rate settings handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use shared::models::{FactoryRate, PieceRates};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::FactoryContext;
use crate::services::rate::{CreateRateInput, UpdateRateInput};
use crate::services::RateService;
use crate::AppState;

pub async fn list_rates(
    State(state): State<AppState>,
    ctx: FactoryContext,
) -> AppResult<Json<Vec<FactoryRate>>> {
    let service = RateService::new(state.db.clone());
    Ok(Json(service.list(ctx.factory_id()).await?))
}

/// Rates currently used for wage costing
pub async fn current_piece_rates(
    State(state): State<AppState>,
    ctx: FactoryContext,
) -> AppResult<Json<PieceRates>> {
    let service = RateService::new(state.db.clone());
    let rates = service
        .piece_rates(ctx.factory_id(), state.config.rates.piece_rates())
        .await?;
    Ok(Json(rates))
}

pub async fn create_rate(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreateRateInput>,
) -> AppResult<(StatusCode, Json<FactoryRate>)> {
    ctx.require_active()?;
    let service = RateService::new(state.db.clone());
    let rate = service.create(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

pub async fn update_rate(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(rate_id): Path<Uuid>,
    Json(input): Json<UpdateRateInput>,
) -> AppResult<Json<FactoryRate>> {
    ctx.require_active()?;
    let service = RateService::new(state.db.clone());
    Ok(Json(service.update(ctx.factory_id(), rate_id, input).await?))
}

pub async fn delete_rate(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(rate_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = RateService::new(state.db.clone());
    service.delete(ctx.factory_id(), rate_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
