//! Customer and supplier directory handlers
//!
//! The handlers are generic over the contact type; the router picks the
//! directory with a turbofish, e.g. `list_contacts::<Customer>`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::FactoryContext;
use crate::services::directory::{Contact, ContactQuery, CreateContactInput, UpdateContactInput};
use crate::services::DirectoryService;
use crate::AppState;

pub async fn list_contacts<T: Contact + Serialize>(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Query(query): Query<ContactQuery>,
) -> AppResult<Json<Vec<T>>> {
    let service = DirectoryService::new(state.db.clone());
    Ok(Json(service.list::<T>(ctx.factory_id(), &query).await?))
}

pub async fn get_contact<T: Contact + Serialize>(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(id): Path<Uuid>,
) -> AppResult<Json<T>> {
    let service = DirectoryService::new(state.db.clone());
    Ok(Json(service.get::<T>(ctx.factory_id(), id).await?))
}

pub async fn create_contact<T: Contact + Serialize>(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CreateContactInput>,
) -> AppResult<(StatusCode, Json<T>)> {
    ctx.require_active()?;
    let service = DirectoryService::new(state.db.clone());
    let contact = service.create::<T>(ctx.factory_id(), input).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact<T: Contact + Serialize>(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateContactInput>,
) -> AppResult<Json<T>> {
    ctx.require_active()?;
    let service = DirectoryService::new(state.db.clone());
    Ok(Json(service.update::<T>(ctx.factory_id(), id, input).await?))
}

pub async fn delete_contact<T: Contact>(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    ctx.require_active()?;
    let service = DirectoryService::new(state.db.clone());
    service.delete::<T>(ctx.factory_id(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
