//! Operating expense handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::OtherExpense;
use shared::types::DateFilter;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::FactoryContext;
use crate::services::expense::{CreateExpenseInput, UpdateExpenseInput};
use crate::services::ExpenseService;
use crate::AppState;

pub async fn list_expenses(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(dates): Query<DateFilter>,
) -> AppResult<Json<Vec<OtherExpense>>> {
    let service = ExpenseService::new(state.db.clone());
    Ok(Json(service.list(ctx.factory_id(), &dates).await?))
}

pub async fn get_expense(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(expense_id): Path<Uuid>,
) -> AppResult<Json<OtherExpense>> {
    let service = ExpenseService::new(state.db.clone());
    Ok(Json(service.get(ctx.factory_id(), expense_id).await?))
}

pub async fn create_expense(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreateExpenseInput>,
) -> AppResult<(StatusCode, Json<OtherExpense>)> {
    ctx.require_active()?;
    let service = ExpenseService::new(state.db.clone());
    let expense = service.create(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn update_expense(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(expense_id): Path<Uuid>,
    Json(input): Json<UpdateExpenseInput>,
) -> AppResult<Json<OtherExpense>> {
    ctx.require_active()?;
    let service = ExpenseService::new(state.db.clone());
    Ok(Json(service.update(ctx.factory_id(), expense_id, input).await?))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(expense_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = ExpenseService::new(state.db.clone());
    service.delete(ctx.factory_id(), expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
