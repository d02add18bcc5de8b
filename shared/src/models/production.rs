//! Production models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A product the factory makes (e.g. "Red brick 9x4x3")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductDefinition {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub name: String,
    /// Units produced by one punch of the press
    pub items_per_punch: Option<i32>,
    pub size_description: Option<String>,
    pub unit: String,
    pub created_at: DateTime<Utc>,
}

impl ProductDefinition {
    pub const DEFAULT_UNIT: &'static str = "pieces";

    /// Units expected from a number of punches, when the yield is known
    pub fn expected_units(&self, punches: i32) -> Option<i64> {
        self.items_per_punch
            .map(|per_punch| i64::from(per_punch) * i64::from(punches))
    }
}

/// A day's production of one product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductionLog {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub date: NaiveDate,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub punches: Option<i32>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}
