//! Employee and employee payment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::{Employee, EmployeePayment};
use shared::types::DateFilter;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::FactoryContext;
use crate::services::payroll::{
    CreateEmployeeInput, CreatePaymentInput, EmployeeQuery, UpdateEmployeeInput, UpdatePaymentInput,
};
use crate::services::PayrollService;
use crate::AppState;

pub async fn list_employees(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let service = PayrollService::new(state.db.clone());
    Ok(Json(service.list_employees(ctx.factory_id(), &query).await?))
}

pub async fn get_employee(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let service = PayrollService::new(state.db.clone());
    Ok(Json(service.get_employee(ctx.factory_id(), employee_id).await?))
}

pub async fn create_employee(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreateEmployeeInput>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    ctx.require_active()?;
    let service = PayrollService::new(state.db.clone());
    let employee = service.create_employee(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn update_employee(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<UpdateEmployeeInput>,
) -> AppResult<Json<Employee>> {
    ctx.require_active()?;
    let service = PayrollService::new(state.db.clone());
    Ok(Json(service.update_employee(ctx.factory_id(), employee_id, input).await?))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(employee_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = PayrollService::new(state.db.clone());
    service.delete_employee(ctx.factory_id(), employee_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_employee_payments(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(dates): Query<DateFilter>,
) -> AppResult<Json<Vec<EmployeePayment>>> {
    let service = PayrollService::new(state.db.clone());
    Ok(Json(service.list_payments(ctx.factory_id(), &dates).await?))
}

pub async fn get_employee_payment(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(payment_id): Path<Uuid>,
) -> AppResult<Json<EmployeePayment>> {
    let service = PayrollService::new(state.db.clone());
    Ok(Json(service.get_payment(ctx.factory_id(), payment_id).await?))
}

pub async fn create_employee_payment(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreatePaymentInput>,
) -> AppResult<(StatusCode, Json<EmployeePayment>)> {
    ctx.require_active()?;
    let service = PayrollService::new(state.db.clone());
    let payment = service.create_payment(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn update_employee_payment(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(payment_id): Path<Uuid>,
    Json(input): Json<UpdatePaymentInput>,
) -> AppResult<Json<EmployeePayment>> {
    ctx.require_active()?;
    let service = PayrollService::new(state.db.clone());
    Ok(Json(service.update_payment(ctx.factory_id(), payment_id, input).await?))
}

pub async fn delete_employee_payment(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(payment_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = PayrollService::new(state.db.clone());
    service.delete_payment(ctx.factory_id(), payment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
