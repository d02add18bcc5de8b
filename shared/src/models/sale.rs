//! Sales and customer receivable models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::LedgerError;

/// A sale of finished product to a customer; doubles as the invoice
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub date: NaiveDate,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub product_id: Uuid,
    pub quantity_sold: i32,
    pub rate_per_unit: Decimal,
    /// `quantity_sold * rate_per_unit`, fixed when the sale is written
    pub total_amount: Decimal,
    pub amount_received: Decimal,
    /// `total_amount - amount_received`
    pub balance_due: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sale {
    /// Total for a quantity at a rate
    pub fn compute_total(quantity_sold: i32, rate_per_unit: Decimal) -> Result<Decimal, LedgerError> {
        Decimal::from(quantity_sold)
            .checked_mul(rate_per_unit)
            .ok_or(LedgerError::Overflow)
    }

    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::of(self.amount_received, self.balance_due)
    }

    /// Human-facing invoice number, e.g. `SALE-3F2A9C1B`
    pub fn invoice_number(&self) -> String {
        let simple = self.id.simple().to_string();
        format!("SALE-{}", simple[..8].to_uppercase())
    }

    pub fn is_open(&self) -> bool {
        self.balance_due > Decimal::ZERO
    }
}

/// Payment status shown against a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl PaymentStatus {
    pub fn of(amount_received: Decimal, balance_due: Decimal) -> Self {
        if balance_due.is_zero() {
            PaymentStatus::Paid
        } else if amount_received.is_zero() {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::Partial
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Partial => write!(f, "Partial"),
            PaymentStatus::Unpaid => write!(f, "Unpaid"),
        }
    }
}

/// Per-customer aggregation of sales; derived on every read, never stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerSummary {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub total_sales: Decimal,
    pub total_received: Decimal,
    pub balance_due: Decimal,
    pub transaction_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status() {
        assert_eq!(PaymentStatus::of(Decimal::from(500), Decimal::ZERO), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::of(Decimal::ZERO, Decimal::from(500)), PaymentStatus::Unpaid);
        assert_eq!(PaymentStatus::of(Decimal::from(100), Decimal::from(400)), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::Partial.to_string(), "Partial");
    }

    #[test]
    fn test_compute_total() {
        assert_eq!(Sale::compute_total(1500, Decimal::new(75, 1)), Ok(Decimal::from(11250)));
    }

    #[test]
    fn test_compute_total_reports_overflow() {
        assert_eq!(Sale::compute_total(1000, Decimal::MAX), Err(LedgerError::Overflow));
    }

    #[test]
    fn test_invoice_number_uses_id_prefix() {
        let id = Uuid::parse_str("3f2a9c1b-0000-4000-8000-000000000000").unwrap();
        let sale = Sale {
            id,
            factory_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            customer_name: "Ramesh".to_string(),
            customer_phone: None,
            product_id: Uuid::new_v4(),
            quantity_sold: 10,
            rate_per_unit: Decimal::from(8),
            total_amount: Decimal::from(80),
            amount_received: Decimal::ZERO,
            balance_due: Decimal::from(80),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(sale.invoice_number(), "SALE-3F2A9C1B");
        assert!(sale.is_open());
    }

    /// Money crosses the wire as strings so no precision is lost in JavaScript
    #[test]
    fn test_amounts_serialize_as_strings() {
        let summary = CustomerSummary {
            customer_name: "Ramesh".to_string(),
            customer_phone: None,
            total_sales: Decimal::new(112505, 1),
            total_received: Decimal::ZERO,
            balance_due: Decimal::new(112505, 1),
            transaction_count: 2,
        };
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["total_sales"], "11250.5");
        assert_eq!(json["balance_due"], "11250.5");
        assert_eq!(json["transaction_count"], 2);

        let back: CustomerSummary = serde_json::from_value(json).unwrap();
        assert_eq!(back.total_sales, summary.total_sales);
    }
}
