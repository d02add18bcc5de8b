//! Raw material inventory models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerError;

/// A raw material (clay, coal, sand, cement...) tracked by the factory
///
/// `current_stock_qty` and `average_cost_per_unit` are cached results of
/// [`crate::ledger::recompute_stock`] over the material's full history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Material {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub material_name: String,
    pub unit: String,
    pub current_stock_qty: Decimal,
    pub average_cost_per_unit: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Value of stock on hand at the weighted average cost
    pub fn stock_value(&self) -> Result<Decimal, LedgerError> {
        self.current_stock_qty
            .checked_mul(self.average_cost_per_unit)
            .ok_or(LedgerError::Overflow)
    }

    /// Stock has run out (or gone negative through over-consumption)
    pub fn is_out_of_stock(&self) -> bool {
        self.current_stock_qty <= Decimal::ZERO
    }
}

/// A purchase of material from a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MaterialPurchase {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub material_id: Uuid,
    pub date: NaiveDate,
    pub quantity_purchased: Decimal,
    pub unit_cost: Decimal,
    pub supplier_name: String,
    pub supplier_phone: Option<String>,
    pub payment_made: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaterialPurchase {
    pub fn total_cost(&self) -> Result<Decimal, LedgerError> {
        self.quantity_purchased
            .checked_mul(self.unit_cost)
            .ok_or(LedgerError::Overflow)
    }
}

/// Consumption of material in production or elsewhere
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MaterialUsage {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub material_id: Uuid,
    pub date: NaiveDate,
    pub quantity_used: Decimal,
    pub purpose: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
