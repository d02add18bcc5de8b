//! Operating expense service

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::OtherExpense;
use shared::types::DateFilter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const EXPENSE_COLUMNS: &str = "id, factory_id, date, expense_type, description, amount, \
     vendor_name, receipt_number, notes, created_at, updated_at";

/// Expense service
#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenseInput {
    pub date: NaiveDate,
    pub expense_type: String,
    pub description: String,
    pub amount: Decimal,
    pub vendor_name: Option<String>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseInput {
    pub date: Option<NaiveDate>,
    pub expense_type: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub vendor_name: Option<String>,
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

fn validate_expense(expense_type: &str, description: &str, amount: Decimal) -> AppResult<()> {
    use shared::validation::{validate_positive_amount, validate_required};

    validate_required(expense_type).map_err(|m| AppError::validation("expense_type", m))?;
    validate_required(description).map_err(|m| AppError::validation("description", m))?;
    validate_positive_amount(amount).map_err(|m| AppError::validation("amount", m))?;
    Ok(())
}

impl ExpenseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, factory_id: Uuid, dates: &DateFilter) -> AppResult<Vec<OtherExpense>> {
        let expenses = sqlx::query_as::<_, OtherExpense>(&format!(
            r#"
            SELECT {} FROM other_expenses
            WHERE factory_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date DESC, created_at DESC
            "#,
            EXPENSE_COLUMNS
        ))
        .bind(factory_id)
        .bind(dates.start_or_min())
        .bind(dates.end_or_max())
        .fetch_all(&self.db)
        .await?;

        Ok(expenses)
    }

    pub async fn get(&self, factory_id: Uuid, expense_id: Uuid) -> AppResult<OtherExpense> {
        sqlx::query_as::<_, OtherExpense>(&format!(
            "SELECT {} FROM other_expenses WHERE id = $1 AND factory_id = $2",
            EXPENSE_COLUMNS
        ))
        .bind(expense_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense".to_string()))
    }

    pub async fn create(&self, factory_id: Uuid, input: CreateExpenseInput) -> AppResult<OtherExpense> {
        validate_expense(&input.expense_type, &input.description, input.amount)?;

        let expense = sqlx::query_as::<_, OtherExpense>(&format!(
            r#"
            INSERT INTO other_expenses (
                factory_id, date, expense_type, description, amount, vendor_name, receipt_number, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.date)
        .bind(input.expense_type.trim())
        .bind(input.description.trim())
        .bind(input.amount)
        .bind(&input.vendor_name)
        .bind(&input.receipt_number)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(expense)
    }

    pub async fn update(
        &self,
        factory_id: Uuid,
        expense_id: Uuid,
        input: UpdateExpenseInput,
    ) -> AppResult<OtherExpense> {
        let existing = self.get(factory_id, expense_id).await?;
        let expense_type = input.expense_type.unwrap_or(existing.expense_type);
        let description = input.description.unwrap_or(existing.description);
        let amount = input.amount.unwrap_or(existing.amount);
        validate_expense(&expense_type, &description, amount)?;

        let expense = sqlx::query_as::<_, OtherExpense>(&format!(
            r#"
            UPDATE other_expenses
            SET date = $1, expense_type = $2, description = $3, amount = $4, vendor_name = $5,
                receipt_number = $6, notes = $7, updated_at = NOW()
            WHERE id = $8 AND factory_id = $9
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        ))
        .bind(input.date.unwrap_or(existing.date))
        .bind(expense_type.trim())
        .bind(description.trim())
        .bind(amount)
        .bind(input.vendor_name.or(existing.vendor_name))
        .bind(input.receipt_number.or(existing.receipt_number))
        .bind(input.notes.or(existing.notes))
        .bind(expense_id)
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        Ok(expense)
    }

    pub async fn delete(&self, factory_id: Uuid, expense_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM other_expenses WHERE id = $1 AND factory_id = $2")
            .bind(expense_id)
            .bind(factory_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Expense".to_string()));
        }

        Ok(())
    }
}
