//! Factory onboarding and subscription management

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use shared::models::{Factory, Plan, SubscriptionState, SubscriptionStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub(crate) const FACTORY_COLUMNS: &str = "id, owner_id, name, location, subscription_status, \
     trial_ends_at, plan_expiry_date, plan_type, created_at";

/// Factory service
#[derive(Clone)]
pub struct FactoryService {
    db: PgPool,
    trial_days: i64,
}

/// Input for creating the caller's factory
#[derive(Debug, Deserialize)]
pub struct CreateFactoryInput {
    pub name: String,
    pub location: Option<String>,
}

/// Input for updating factory details
#[derive(Debug, Deserialize)]
pub struct UpdateFactoryInput {
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Input for completing a plan purchase
#[derive(Debug, Deserialize)]
pub struct CompleteSubscriptionInput {
    pub plan_id: String,
}

/// New plan fields after a purchase
pub fn plan_window(plan: Plan, now: DateTime<Utc>) -> (String, DateTime<Utc>) {
    (plan.as_str().to_string(), now + plan.duration())
}

impl FactoryService {
    pub fn new(db: PgPool, trial_days: i64) -> Self {
        Self { db, trial_days }
    }

    /// The factory owned by a user, if one has been created
    pub async fn find_by_owner(&self, owner_id: Uuid) -> AppResult<Option<Factory>> {
        let factory = sqlx::query_as::<_, Factory>(&format!(
            "SELECT {} FROM factories WHERE owner_id = $1",
            FACTORY_COLUMNS
        ))
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(factory)
    }

    /// Create the caller's factory and start its trial
    pub async fn create(&self, owner_id: Uuid, input: CreateFactoryInput) -> AppResult<Factory> {
        shared::validation::validate_required(&input.name)
            .map_err(|m| AppError::validation("name", m))?;

        if self.find_by_owner(owner_id).await?.is_some() {
            return Err(AppError::DuplicateEntry("owner".to_string()));
        }

        let trial_ends_at = Utc::now() + Duration::days(self.trial_days);

        let factory = sqlx::query_as::<_, Factory>(&format!(
            r#"
            INSERT INTO factories (owner_id, name, location, subscription_status, trial_ends_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            FACTORY_COLUMNS
        ))
        .bind(owner_id)
        .bind(input.name.trim())
        .bind(&input.location)
        .bind(SubscriptionState::Trial.as_str())
        .bind(trial_ends_at)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(factory_id = %factory.id, %trial_ends_at, "Factory created, trial started");

        Ok(factory)
    }

    /// Update name or location
    pub async fn update(&self, factory: &Factory, input: UpdateFactoryInput) -> AppResult<Factory> {
        let name = input.name.unwrap_or_else(|| factory.name.clone());
        shared::validation::validate_required(&name).map_err(|m| AppError::validation("name", m))?;
        let location = input.location.or_else(|| factory.location.clone());

        let factory = sqlx::query_as::<_, Factory>(&format!(
            "UPDATE factories SET name = $1, location = $2 WHERE id = $3 RETURNING {}",
            FACTORY_COLUMNS
        ))
        .bind(name.trim())
        .bind(&location)
        .bind(factory.id)
        .fetch_one(&self.db)
        .await?;

        Ok(factory)
    }

    /// Activate a paid plan
    ///
    /// No payment gateway is consulted; the plan id is the only input.
    pub async fn complete_subscription(
        &self,
        factory_id: Uuid,
        plan_id: &str,
    ) -> AppResult<SubscriptionStatus> {
        let plan = shared::validation::validate_plan(plan_id)
            .map_err(|m| AppError::validation("plan_id", m))?;

        let now = Utc::now();
        let (plan_type, expiry) = plan_window(plan, now);

        let factory = sqlx::query_as::<_, Factory>(&format!(
            r#"
            UPDATE factories
            SET subscription_status = $1, plan_type = $2, plan_expiry_date = $3
            WHERE id = $4
            RETURNING {}
            "#,
            FACTORY_COLUMNS
        ))
        .bind(SubscriptionState::Active.as_str())
        .bind(&plan_type)
        .bind(expiry)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Factory".to_string()))?;

        tracing::info!(%factory_id, plan = %plan_type, %expiry, "Subscription activated");

        Ok(SubscriptionStatus::evaluate(&factory, now))
    }

    /// Re-read the subscription from storage
    pub async fn restore(&self, owner_id: Uuid) -> AppResult<SubscriptionStatus> {
        let factory = self
            .find_by_owner(owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Factory".to_string()))?;

        Ok(SubscriptionStatus::evaluate(&factory, Utc::now()))
    }
}
