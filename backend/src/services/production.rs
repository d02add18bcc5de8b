//! Production service: product definitions and daily production logs

use chrono::NaiveDate;
use serde::Deserialize;
use shared::models::{ProductDefinition, ProductionLog};
use shared::types::DateFilter;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const PRODUCT_COLUMNS: &str =
    "id, factory_id, name, items_per_punch, size_description, unit, created_at";

const LOG_COLUMNS: &str =
    "id, factory_id, date, product_id, product_name, quantity, punches, remarks, created_at";

/// Production service
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub items_per_punch: Option<i32>,
    pub size_description: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub items_per_punch: Option<i32>,
    pub size_description: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductionInput {
    pub date: NaiveDate,
    pub product_id: Uuid,
    pub quantity: i32,
    pub punches: Option<i32>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductionInput {
    pub date: Option<NaiveDate>,
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub punches: Option<i32>,
    pub remarks: Option<String>,
}

fn validate_counts(quantity: i32, punches: Option<i32>) -> AppResult<()> {
    shared::validation::validate_quantity(quantity).map_err(|m| AppError::validation("quantity", m))?;
    if punches.is_some_and(|p| p < 0) {
        return Err(AppError::validation("punches", "Punches cannot be negative"));
    }
    Ok(())
}

impl ProductionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Product definitions
    // ------------------------------------------------------------------

    pub async fn list_products(&self, factory_id: Uuid) -> AppResult<Vec<ProductDefinition>> {
        let products = sqlx::query_as::<_, ProductDefinition>(&format!(
            "SELECT {} FROM product_definitions WHERE factory_id = $1 ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .bind(factory_id)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    pub async fn get_product(&self, factory_id: Uuid, product_id: Uuid) -> AppResult<ProductDefinition> {
        sqlx::query_as::<_, ProductDefinition>(&format!(
            "SELECT {} FROM product_definitions WHERE id = $1 AND factory_id = $2",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub async fn create_product(
        &self,
        factory_id: Uuid,
        input: CreateProductInput,
    ) -> AppResult<ProductDefinition> {
        shared::validation::validate_required(&input.name)
            .map_err(|m| AppError::validation("name", m))?;
        if input.items_per_punch.is_some_and(|n| n <= 0) {
            return Err(AppError::validation("items_per_punch", "Items per punch must be at least 1"));
        }

        let unit = input
            .unit
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| ProductDefinition::DEFAULT_UNIT.to_string());

        let product = sqlx::query_as::<_, ProductDefinition>(&format!(
            r#"
            INSERT INTO product_definitions (factory_id, name, items_per_punch, size_description, unit)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.name.trim())
        .bind(input.items_per_punch)
        .bind(&input.size_description)
        .bind(&unit)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    pub async fn update_product(
        &self,
        factory_id: Uuid,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<ProductDefinition> {
        let existing = self.get_product(factory_id, product_id).await?;
        let name = input.name.unwrap_or(existing.name);
        shared::validation::validate_required(&name).map_err(|m| AppError::validation("name", m))?;

        let product = sqlx::query_as::<_, ProductDefinition>(&format!(
            r#"
            UPDATE product_definitions
            SET name = $1, items_per_punch = $2, size_description = $3, unit = $4
            WHERE id = $5 AND factory_id = $6
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(name.trim())
        .bind(input.items_per_punch.or(existing.items_per_punch))
        .bind(input.size_description.or(existing.size_description))
        .bind(input.unit.unwrap_or(existing.unit))
        .bind(product_id)
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    pub async fn delete_product(&self, factory_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM sales WHERE product_id = $1 AND factory_id = $2)
                OR EXISTS(SELECT 1 FROM production_logs WHERE product_id = $1 AND factory_id = $2)
            "#,
        )
        .bind(product_id)
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::validation(
                "product_id",
                "Product has sales or production recorded against it",
            ));
        }

        let result = sqlx::query("DELETE FROM product_definitions WHERE id = $1 AND factory_id = $2")
            .bind(product_id)
            .bind(factory_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Production logs
    // ------------------------------------------------------------------

    pub async fn list_logs(&self, factory_id: Uuid, dates: &DateFilter) -> AppResult<Vec<ProductionLog>> {
        let logs = sqlx::query_as::<_, ProductionLog>(&format!(
            r#"
            SELECT {} FROM production_logs
            WHERE factory_id = $1 AND date BETWEEN $2 AND $3
            ORDER BY date DESC, created_at DESC
            "#,
            LOG_COLUMNS
        ))
        .bind(factory_id)
        .bind(dates.start_or_min())
        .bind(dates.end_or_max())
        .fetch_all(&self.db)
        .await?;

        Ok(logs)
    }

    pub async fn get_log(&self, factory_id: Uuid, log_id: Uuid) -> AppResult<ProductionLog> {
        sqlx::query_as::<_, ProductionLog>(&format!(
            "SELECT {} FROM production_logs WHERE id = $1 AND factory_id = $2",
            LOG_COLUMNS
        ))
        .bind(log_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production log".to_string()))
    }

    pub async fn create_log(
        &self,
        factory_id: Uuid,
        input: CreateProductionInput,
    ) -> AppResult<ProductionLog> {
        validate_counts(input.quantity, input.punches)?;
        let product = self.get_product(factory_id, input.product_id).await?;

        if let Some(expected_units) = input.punches.and_then(|p| product.expected_units(p)) {
            if expected_units != i64::from(input.quantity) {
                tracing::debug!(
                    product = %product.name,
                    expected_units,
                    quantity = input.quantity,
                    "Production quantity differs from punch yield"
                );
            }
        }

        let log = sqlx::query_as::<_, ProductionLog>(&format!(
            r#"
            INSERT INTO production_logs (factory_id, date, product_id, product_name, quantity, punches, remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            LOG_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.date)
        .bind(product.id)
        .bind(&product.name)
        .bind(input.quantity)
        .bind(input.punches)
        .bind(&input.remarks)
        .fetch_one(&self.db)
        .await?;

        Ok(log)
    }

    pub async fn update_log(
        &self,
        factory_id: Uuid,
        log_id: Uuid,
        input: UpdateProductionInput,
    ) -> AppResult<ProductionLog> {
        let existing = self.get_log(factory_id, log_id).await?;
        let quantity = input.quantity.unwrap_or(existing.quantity);
        let punches = input.punches.or(existing.punches);
        validate_counts(quantity, punches)?;

        let (product_id, product_name) = match input.product_id {
            Some(id) if id != existing.product_id => {
                let product = self.get_product(factory_id, id).await?;
                (product.id, product.name)
            }
            _ => (existing.product_id, existing.product_name),
        };

        let log = sqlx::query_as::<_, ProductionLog>(&format!(
            r#"
            UPDATE production_logs
            SET date = $1, product_id = $2, product_name = $3, quantity = $4, punches = $5, remarks = $6
            WHERE id = $7 AND factory_id = $8
            RETURNING {}
            "#,
            LOG_COLUMNS
        ))
        .bind(input.date.unwrap_or(existing.date))
        .bind(product_id)
        .bind(&product_name)
        .bind(quantity)
        .bind(punches)
        .bind(input.remarks.or(existing.remarks))
        .bind(log_id)
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        Ok(log)
    }

    pub async fn delete_log(&self, factory_id: Uuid, log_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM production_logs WHERE id = $1 AND factory_id = $2")
            .bind(log_id)
            .bind(factory_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Production log".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_validation() {
        assert!(validate_counts(1000, Some(100)).is_ok());
        assert!(validate_counts(1000, None).is_ok());
        assert!(validate_counts(0, Some(10)).is_err());
        assert!(validate_counts(10, Some(-1)).is_err());
    }
}
