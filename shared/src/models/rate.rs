//! Piece-rate configuration models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rate type for wages paid per press punch
pub const RATE_PRODUCTION_PER_PUNCH: &str = "production_per_punch";

/// Rate type for wages paid per brick loaded onto a customer's vehicle
pub const RATE_LOADING_PER_BRICK: &str = "loading_per_brick";

/// A configured rate for the factory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct FactoryRate {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub rate_type: String,
    pub rate_amount: Decimal,
    pub effective_date: NaiveDate,
    pub is_active: bool,
    pub product_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The two piece rates used for wage costing in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceRates {
    pub production_per_punch: Decimal,
    pub loading_per_brick: Decimal,
}

impl Default for PieceRates {
    fn default() -> Self {
        Self {
            production_per_punch: Decimal::from(15),
            loading_per_brick: Decimal::from(2),
        }
    }
}

impl PieceRates {
    /// Pick the first active rate of each type, falling back to `defaults`
    ///
    /// A configured rate of zero also falls back.
    pub fn from_rates(rates: &[FactoryRate], defaults: PieceRates) -> Self {
        let active = |rate_type: &str| {
            rates
                .iter()
                .find(|r| r.is_active && r.rate_type == rate_type)
                .map(|r| r.rate_amount)
                .filter(|amount| !amount.is_zero())
        };

        Self {
            production_per_punch: active(RATE_PRODUCTION_PER_PUNCH)
                .unwrap_or(defaults.production_per_punch),
            loading_per_brick: active(RATE_LOADING_PER_BRICK)
                .unwrap_or(defaults.loading_per_brick),
        }
    }
}
