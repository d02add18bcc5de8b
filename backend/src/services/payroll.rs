//! Payroll service: employees and the payments made to them

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{Employee, EmployeePayment};
use shared::types::DateFilter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const EMPLOYEE_COLUMNS: &str = "id, factory_id, name, phone, role, daily_wage, is_active, created_at";

const PAYMENT_COLUMNS: &str =
    "id, factory_id, date, employee_name, amount, payment_type, notes, created_at, updated_at";

/// Payroll service
#[derive(Clone)]
pub struct PayrollService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeInput {
    pub name: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub daily_wage: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub daily_wage: Option<Decimal>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentInput {
    pub date: NaiveDate,
    pub employee_name: String,
    pub amount: Decimal,
    pub payment_type: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentInput {
    pub date: Option<NaiveDate>,
    pub employee_name: Option<String>,
    pub amount: Option<Decimal>,
    pub payment_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    #[serde(default)]
    pub active_only: bool,
}

fn validate_employee(name: &str, phone: Option<&str>, daily_wage: Option<Decimal>) -> AppResult<()> {
    shared::validation::validate_required(name).map_err(|m| AppError::validation("name", m))?;
    shared::validation::validate_optional_phone(phone).map_err(|m| AppError::validation("phone", m))?;
    if let Some(wage) = daily_wage {
        shared::validation::validate_non_negative(wage)
            .map_err(|m| AppError::validation("daily_wage", m))?;
    }
    Ok(())
}

fn validate_payment(employee_name: &str, amount: Decimal, payment_type: &str) -> AppResult<()> {
    use shared::validation::{validate_positive_amount, validate_required};

    validate_required(employee_name).map_err(|m| AppError::validation("employee_name", m))?;
    validate_positive_amount(amount).map_err(|m| AppError::validation("amount", m))?;
    validate_required(payment_type).map_err(|m| AppError::validation("payment_type", m))?;
    Ok(())
}

impl PayrollService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Employees
    // ------------------------------------------------------------------

    pub async fn list_employees(&self, factory_id: Uuid, query: &EmployeeQuery) -> AppResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(&format!(
            r#"
            SELECT {} FROM employees
            WHERE factory_id = $1 AND (NOT $2 OR is_active)
            ORDER BY name
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(factory_id)
        .bind(query.active_only)
        .fetch_all(&self.db)
        .await?;

        Ok(employees)
    }

    pub async fn get_employee(&self, factory_id: Uuid, employee_id: Uuid) -> AppResult<Employee> {
        sqlx::query_as::<_, Employee>(&format!(
            "SELECT {} FROM employees WHERE id = $1 AND factory_id = $2",
            EMPLOYEE_COLUMNS
        ))
        .bind(employee_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))
    }

    pub async fn create_employee(&self, factory_id: Uuid, input: CreateEmployeeInput) -> AppResult<Employee> {
        validate_employee(&input.name, input.phone.as_deref(), input.daily_wage)?;

        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"
            INSERT INTO employees (factory_id, name, phone, role, daily_wage)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.role)
        .bind(input.daily_wage)
        .fetch_one(&self.db)
        .await?;

        Ok(employee)
    }

    pub async fn update_employee(
        &self,
        factory_id: Uuid,
        employee_id: Uuid,
        input: UpdateEmployeeInput,
    ) -> AppResult<Employee> {
        let existing = self.get_employee(factory_id, employee_id).await?;
        let name = input.name.unwrap_or(existing.name);
        let phone = input.phone.or(existing.phone);
        let daily_wage = input.daily_wage.or(existing.daily_wage);
        validate_employee(&name, phone.as_deref(), daily_wage)?;

        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"
            UPDATE employees
            SET name = $1, phone = $2, role = $3, daily_wage = $4, is_active = $5
            WHERE id = $6 AND factory_id = $7
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(name.trim())
        .bind(&phone)
        .bind(input.role.or(existing.role))
        .bind(daily_wage)
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(employee_id)
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        Ok(employee)
    }

    pub async fn delete_employee(&self, factory_id: Uuid, employee_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1 AND factory_id = $2")
            .bind(employee_id)
            .bind(factory_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Employee".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    pub async fn list_payments(&self, factory_id: Uuid, dates: &DateFilter) -> AppResult<Vec<EmployeePayment>> {
        let payments = sqlx::query_as::<_, EmployeePayment>(&format!(
            r#"
            SELECT {} FROM employee_payments
            WHERE factory_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date DESC, created_at DESC
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(factory_id)
        .bind(dates.start_or_min())
        .bind(dates.end_or_max())
        .fetch_all(&self.db)
        .await?;

        Ok(payments)
    }

    pub async fn get_payment(&self, factory_id: Uuid, payment_id: Uuid) -> AppResult<EmployeePayment> {
        sqlx::query_as::<_, EmployeePayment>(&format!(
            "SELECT {} FROM employee_payments WHERE id = $1 AND factory_id = $2",
            PAYMENT_COLUMNS
        ))
        .bind(payment_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Payment".to_string()))
    }

    pub async fn create_payment(&self, factory_id: Uuid, input: CreatePaymentInput) -> AppResult<EmployeePayment> {
        validate_payment(&input.employee_name, input.amount, &input.payment_type)?;

        let payment = sqlx::query_as::<_, EmployeePayment>(&format!(
            r#"
            INSERT INTO employee_payments (factory_id, date, employee_name, amount, payment_type, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.date)
        .bind(input.employee_name.trim())
        .bind(input.amount)
        .bind(input.payment_type.trim().to_lowercase())
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(payment)
    }

    pub async fn update_payment(
        &self,
        factory_id: Uuid,
        payment_id: Uuid,
        input: UpdatePaymentInput,
    ) -> AppResult<EmployeePayment> {
        let existing = self.get_payment(factory_id, payment_id).await?;
        let employee_name = input.employee_name.unwrap_or(existing.employee_name);
        let amount = input.amount.unwrap_or(existing.amount);
        let payment_type = input.payment_type.unwrap_or(existing.payment_type);
        validate_payment(&employee_name, amount, &payment_type)?;

        let payment = sqlx::query_as::<_, EmployeePayment>(&format!(
            r#"
            UPDATE employee_payments
            SET date = $1, employee_name = $2, amount = $3, payment_type = $4, notes = $5,
                updated_at = NOW()
            WHERE id = $6 AND factory_id = $7
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(input.date.unwrap_or(existing.date))
        .bind(employee_name.trim())
        .bind(amount)
        .bind(payment_type.trim().to_lowercase())
        .bind(input.notes.or(existing.notes))
        .bind(payment_id)
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        Ok(payment)
    }

    pub async fn delete_payment(&self, factory_id: Uuid, payment_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM employee_payments WHERE id = $1 AND factory_id = $2")
            .bind(payment_id)
            .bind(factory_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Payment".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_validation() {
        assert!(validate_employee("Raju", Some("9876543210"), Some(Decimal::from(600))).is_ok());
        assert!(validate_employee("Raju", None, None).is_ok());
        assert!(validate_employee("", None, None).is_err());
        assert!(validate_employee("Raju", Some("123"), None).is_err());
        assert!(validate_employee("Raju", None, Some(Decimal::from(-1))).is_err());
    }

    #[test]
    fn test_payment_validation() {
        assert!(validate_payment("Raju", Decimal::from(500), "advance").is_ok());
        assert!(validate_payment("Raju", Decimal::ZERO, "advance").is_err());
        assert!(validate_payment("Raju", Decimal::from(500), " ").is_err());
    }
}
