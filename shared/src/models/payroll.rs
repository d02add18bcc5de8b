//! Employee and payroll models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A factory worker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub daily_wage: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A payment made to an employee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EmployeePayment {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub date: NaiveDate,
    pub employee_name: String,
    pub amount: Decimal,
    /// Free text; bucketed through [`PaymentType::classify`]
    pub payment_type: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Report bucket for employee payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    Salary,
    Advance,
    Bonus,
    Incentive,
}

impl PaymentType {
    /// Bucket a stored payment type, case-insensitively.
    ///
    /// Anything unrecognized is counted as salary.
    pub fn classify(payment_type: &str) -> Self {
        match payment_type.trim().to_lowercase().as_str() {
            "advance" => PaymentType::Advance,
            "bonus" => PaymentType::Bonus,
            "incentive" => PaymentType::Incentive,
            _ => PaymentType::Salary,
        }
    }
}
