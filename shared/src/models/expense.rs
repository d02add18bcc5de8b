//! Operating expense models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An expense outside materials and payroll (diesel, electricity, repairs...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OtherExpense {
    pub id: Uuid,
    pub factory_id: Uuid,
    pub date: NaiveDate,
    /// Free text; bucketed through [`ExpenseCategory::classify`]
    pub expense_type: String,
    pub description: String,
    pub amount: Decimal,
    pub vendor_name: Option<String>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Report bucket for operating expenses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Transport,
    Utilities,
    Salaries,
    Repairs,
    Miscellaneous,
}

impl ExpenseCategory {
    /// Bucket a stored expense type, case-insensitively.
    ///
    /// Anything unrecognized lands in miscellaneous; it is never dropped.
    pub fn classify(expense_type: &str) -> Self {
        match expense_type.trim().to_lowercase().as_str() {
            "transport" => ExpenseCategory::Transport,
            "utilities" => ExpenseCategory::Utilities,
            "salaries" | "office salaries" => ExpenseCategory::Salaries,
            "repairs" => ExpenseCategory::Repairs,
            _ => ExpenseCategory::Miscellaneous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_expense_types() {
        assert_eq!(ExpenseCategory::classify("Transport"), ExpenseCategory::Transport);
        assert_eq!(ExpenseCategory::classify("utilities"), ExpenseCategory::Utilities);
        assert_eq!(ExpenseCategory::classify("Office Salaries"), ExpenseCategory::Salaries);
        assert_eq!(ExpenseCategory::classify("salaries"), ExpenseCategory::Salaries);
        assert_eq!(ExpenseCategory::classify("REPAIRS"), ExpenseCategory::Repairs);
    }

    #[test]
    fn test_unrecognized_expense_is_miscellaneous() {
        assert_eq!(ExpenseCategory::classify("tea and snacks"), ExpenseCategory::Miscellaneous);
        assert_eq!(ExpenseCategory::classify("miscellaneous"), ExpenseCategory::Miscellaneous);
    }
}
