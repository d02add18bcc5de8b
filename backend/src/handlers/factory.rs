//! Factory and subscription handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use shared::models::{Factory, SubscriptionStatus};

use crate::error::AppResult;
use crate::middleware::{CurrentUser, FactoryContext};
use crate::services::factory::{CompleteSubscriptionInput, CreateFactoryInput, UpdateFactoryInput};
use crate::services::FactoryService;
use crate::AppState;

#[derive(Serialize)]
pub struct FactoryResponse {
    pub factory: Factory,
    pub subscription: SubscriptionStatus,
}

fn factory_service(state: &AppState) -> FactoryService {
    FactoryService::new(state.db.clone(), state.config.subscription.trial_days)
}

/// Create the caller's factory and start its trial
pub async fn create_factory(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateFactoryInput>,
) -> AppResult<(StatusCode, Json<FactoryResponse>)> {
    let factory = factory_service(&state).create(user.user_id, input).await?;
    let subscription = SubscriptionStatus::evaluate(&factory, chrono::Utc::now());

    Ok((StatusCode::CREATED, Json(FactoryResponse { factory, subscription })))
}

pub async fn get_my_factory(ctx: FactoryContext) -> Json<FactoryResponse> {
    Json(FactoryResponse {
        factory: ctx.factory,
        subscription: ctx.subscription,
    })
}

pub async fn update_my_factory(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<UpdateFactoryInput>,
) -> AppResult<Json<FactoryResponse>> {
    ctx.require_active()?;

    let factory = factory_service(&state).update(&ctx.factory, input).await?;

    Ok(Json(FactoryResponse {
        factory,
        subscription: ctx.subscription,
    }))
}

pub async fn subscription_status(ctx: FactoryContext) -> Json<SubscriptionStatus> {
    Json(ctx.subscription)
}

/// Activate a paid plan; allowed even when the trial has lapsed
pub async fn complete_subscription(
    State(state): State<AppState>,
    ctx: FactoryContext,
    Json(input): Json<CompleteSubscriptionInput>,
) -> AppResult<Json<SubscriptionStatus>> {
    let status = factory_service(&state)
        .complete_subscription(ctx.factory_id(), &input.plan_id)
        .await?;

    Ok(Json(status))
}

pub async fn restore_subscription(
    State(state): State<AppState>,
    ctx: FactoryContext,
) -> AppResult<Json<SubscriptionStatus>> {
    let status = factory_service(&state).restore(ctx.user.user_id).await?;

    Ok(Json(status))
}
