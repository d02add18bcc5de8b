//! Factory rate settings

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{FactoryRate, PieceRates};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const RATE_COLUMNS: &str = "id, factory_id, rate_type, rate_amount, effective_date, is_active, \
     product_id, created_at, updated_at";

/// Rate service
#[derive(Clone)]
pub struct RateService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateRateInput {
    pub rate_type: String,
    pub rate_amount: Decimal,
    pub effective_date: Option<NaiveDate>,
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRateInput {
    pub rate_amount: Option<Decimal>,
    pub effective_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl RateService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// All rates, newest effective date first
    pub async fn list(&self, factory_id: Uuid) -> AppResult<Vec<FactoryRate>> {
        let rates = sqlx::query_as::<_, FactoryRate>(&format!(
            r#"
            SELECT {} FROM factory_rates
            WHERE factory_id = $1
            ORDER BY effective_date DESC, created_at DESC
            "#,
            RATE_COLUMNS
        ))
        .bind(factory_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rates)
    }

    /// Piece rates in force for costing, falling back to `defaults`
    pub async fn piece_rates(&self, factory_id: Uuid, defaults: PieceRates) -> AppResult<PieceRates> {
        let rates = self.list(factory_id).await?;
        Ok(PieceRates::from_rates(&rates, defaults))
    }

    /// Add a rate; it replaces any active rate of the same type and product
    pub async fn create(&self, factory_id: Uuid, input: CreateRateInput) -> AppResult<FactoryRate> {
        shared::validation::validate_required(&input.rate_type)
            .map_err(|m| AppError::validation("rate_type", m))?;
        shared::validation::validate_non_negative(input.rate_amount)
            .map_err(|m| AppError::validation("rate_amount", m))?;

        let rate_type = input.rate_type.trim().to_lowercase();
        let effective_date = input.effective_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE factory_rates SET is_active = false, updated_at = NOW()
            WHERE factory_id = $1 AND rate_type = $2 AND product_id IS NOT DISTINCT FROM $3 AND is_active
            "#,
        )
        .bind(factory_id)
        .bind(&rate_type)
        .bind(input.product_id)
        .execute(&mut *tx)
        .await?;

        let rate = sqlx::query_as::<_, FactoryRate>(&format!(
            r#"
            INSERT INTO factory_rates (factory_id, rate_type, rate_amount, effective_date, product_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            RATE_COLUMNS
        ))
        .bind(factory_id)
        .bind(&rate_type)
        .bind(input.rate_amount)
        .bind(effective_date)
        .bind(input.product_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(%factory_id, rate_type = %rate.rate_type, amount = %rate.rate_amount, "Rate set");

        Ok(rate)
    }

    pub async fn update(&self, factory_id: Uuid, rate_id: Uuid, input: UpdateRateInput) -> AppResult<FactoryRate> {
        let existing = sqlx::query_as::<_, FactoryRate>(&format!(
            "SELECT {} FROM factory_rates WHERE id = $1 AND factory_id = $2",
            RATE_COLUMNS
        ))
        .bind(rate_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Rate".to_string()))?;

        let rate_amount = input.rate_amount.unwrap_or(existing.rate_amount);
        shared::validation::validate_non_negative(rate_amount)
            .map_err(|m| AppError::validation("rate_amount", m))?;

        let rate = sqlx::query_as::<_, FactoryRate>(&format!(
            r#"
            UPDATE factory_rates
            SET rate_amount = $1, effective_date = $2, is_active = $3, updated_at = NOW()
            WHERE id = $4 AND factory_id = $5
            RETURNING {}
            "#,
            RATE_COLUMNS
        ))
        .bind(rate_amount)
        .bind(input.effective_date.unwrap_or(existing.effective_date))
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(rate_id)
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        Ok(rate)
    }

    pub async fn delete(&self, factory_id: Uuid, rate_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM factory_rates WHERE id = $1 AND factory_id = $2")
            .bind(rate_id)
            .bind(factory_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Rate".to_string()));
        }

        Ok(())
    }
}
