//! Raw material service: materials, purchases, usage and stock recompute
//!
//! Every purchase or usage write recomputes the owning material's cached
//! stock and average cost from its complete history, inside the same
//! transaction as the write. The material row is locked while this happens so
//! concurrent writes against one material serialize.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::ledger::{recompute_stock, LedgerError, StockPosition};
use shared::models::{Material, MaterialPurchase, MaterialUsage};
use shared::types::DateFilter;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const MATERIAL_COLUMNS: &str = "id, factory_id, material_name, unit, current_stock_qty, \
     average_cost_per_unit, created_at, updated_at";

const PURCHASE_COLUMNS: &str = "id, factory_id, material_id, date, quantity_purchased, unit_cost, \
     supplier_name, supplier_phone, payment_made, notes, created_at, updated_at";

const USAGE_COLUMNS: &str =
    "id, factory_id, material_id, date, quantity_used, purpose, created_at, updated_at";

/// Material service
#[derive(Clone)]
pub struct MaterialService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateMaterialInput {
    pub material_name: String,
    pub unit: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMaterialInput {
    pub material_name: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInput {
    pub material_id: Uuid,
    pub date: NaiveDate,
    pub quantity_purchased: Decimal,
    pub unit_cost: Decimal,
    pub supplier_name: String,
    pub supplier_phone: Option<String>,
    #[serde(default)]
    pub payment_made: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePurchaseInput {
    pub material_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub quantity_purchased: Option<Decimal>,
    pub unit_cost: Option<Decimal>,
    pub supplier_name: Option<String>,
    pub supplier_phone: Option<String>,
    pub payment_made: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUsageInput {
    pub material_id: Uuid,
    pub date: NaiveDate,
    pub quantity_used: Decimal,
    pub purpose: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUsageInput {
    pub material_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub quantity_used: Option<Decimal>,
    pub purpose: Option<String>,
}

/// Optional narrowing for purchase and usage lists
#[derive(Debug, Default, Deserialize)]
pub struct MovementQuery {
    pub material_id: Option<Uuid>,
    #[serde(flatten)]
    pub dates: DateFilter,
}

/// Valuation line for one material
#[derive(Debug, Clone, Serialize)]
pub struct MaterialValuation {
    pub material_id: Uuid,
    pub material_name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub average_cost: Decimal,
    pub stock_value: Decimal,
    pub out_of_stock: bool,
}

/// Factory-wide inventory valuation
#[derive(Debug, Clone, Serialize)]
pub struct InventoryValuation {
    pub materials: Vec<MaterialValuation>,
    pub total_value: Decimal,
    pub out_of_stock_count: usize,
}

impl InventoryValuation {
    pub fn from_materials(materials: &[Material]) -> Result<Self, LedgerError> {
        let lines = materials
            .iter()
            .map(|m| -> Result<MaterialValuation, LedgerError> {
                Ok(MaterialValuation {
                    material_id: m.id,
                    material_name: m.material_name.clone(),
                    unit: m.unit.clone(),
                    quantity: m.current_stock_qty,
                    average_cost: m.average_cost_per_unit,
                    stock_value: m.stock_value()?,
                    out_of_stock: m.is_out_of_stock(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total_value = lines
            .iter()
            .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.stock_value))
            .ok_or(LedgerError::Overflow)?;

        Ok(Self {
            total_value,
            out_of_stock_count: lines.iter().filter(|l| l.out_of_stock).count(),
            materials: lines,
        })
    }
}

fn validate_purchase(
    quantity: Decimal,
    unit_cost: Decimal,
    payment_made: Decimal,
    supplier_name: &str,
) -> AppResult<()> {
    use shared::validation::{validate_non_negative, validate_positive_amount, validate_required};

    validate_positive_amount(quantity).map_err(|m| AppError::validation("quantity_purchased", m))?;
    validate_non_negative(unit_cost).map_err(|m| AppError::validation("unit_cost", m))?;
    validate_non_negative(payment_made).map_err(|m| AppError::validation("payment_made", m))?;
    validate_required(supplier_name).map_err(|m| AppError::validation("supplier_name", m))?;
    Ok(())
}

fn validate_usage(quantity: Decimal, purpose: &str) -> AppResult<()> {
    shared::validation::validate_positive_amount(quantity)
        .map_err(|m| AppError::validation("quantity_used", m))?;
    shared::validation::validate_required(purpose).map_err(|m| AppError::validation("purpose", m))?;
    Ok(())
}

/// Materials whose cached figures must be refreshed after moving a record
/// from `old` to `new`, in ascending id order so row locks are always
/// taken in the same order
fn affected_materials(old: Uuid, new: Uuid) -> Vec<Uuid> {
    match old.cmp(&new) {
        std::cmp::Ordering::Equal => vec![new],
        std::cmp::Ordering::Less => vec![old, new],
        std::cmp::Ordering::Greater => vec![new, old],
    }
}

impl MaterialService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Materials
    // ------------------------------------------------------------------

    pub async fn list_materials(&self, factory_id: Uuid) -> AppResult<Vec<Material>> {
        let materials = sqlx::query_as::<_, Material>(&format!(
            "SELECT {} FROM materials WHERE factory_id = $1 ORDER BY material_name",
            MATERIAL_COLUMNS
        ))
        .bind(factory_id)
        .fetch_all(&self.db)
        .await?;

        Ok(materials)
    }

    pub async fn get_material(&self, factory_id: Uuid, material_id: Uuid) -> AppResult<Material> {
        sqlx::query_as::<_, Material>(&format!(
            "SELECT {} FROM materials WHERE id = $1 AND factory_id = $2",
            MATERIAL_COLUMNS
        ))
        .bind(material_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Material".to_string()))
    }

    pub async fn create_material(
        &self,
        factory_id: Uuid,
        input: CreateMaterialInput,
    ) -> AppResult<Material> {
        shared::validation::validate_required(&input.material_name)
            .map_err(|m| AppError::validation("material_name", m))?;
        shared::validation::validate_required(&input.unit)
            .map_err(|m| AppError::validation("unit", m))?;

        let material = sqlx::query_as::<_, Material>(&format!(
            r#"
            INSERT INTO materials (factory_id, material_name, unit)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.material_name.trim())
        .bind(input.unit.trim())
        .fetch_one(&self.db)
        .await?;

        Ok(material)
    }

    pub async fn update_material(
        &self,
        factory_id: Uuid,
        material_id: Uuid,
        input: UpdateMaterialInput,
    ) -> AppResult<Material> {
        let existing = self.get_material(factory_id, material_id).await?;
        let name = input.material_name.unwrap_or(existing.material_name);
        let unit = input.unit.unwrap_or(existing.unit);

        shared::validation::validate_required(&name)
            .map_err(|m| AppError::validation("material_name", m))?;
        shared::validation::validate_required(&unit).map_err(|m| AppError::validation("unit", m))?;

        let material = sqlx::query_as::<_, Material>(&format!(
            r#"
            UPDATE materials SET material_name = $1, unit = $2, updated_at = NOW()
            WHERE id = $3 AND factory_id = $4
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(name.trim())
        .bind(unit.trim())
        .bind(material_id)
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        Ok(material)
    }

    /// Delete a material along with its purchase and usage history
    pub async fn delete_material(&self, factory_id: Uuid, material_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1 AND factory_id = $2")
            .bind(material_id)
            .bind(factory_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Material".to_string()));
        }

        Ok(())
    }

    pub async fn valuation(&self, factory_id: Uuid) -> AppResult<InventoryValuation> {
        let materials = self.list_materials(factory_id).await?;
        Ok(InventoryValuation::from_materials(&materials)?)
    }

    // ------------------------------------------------------------------
    // Stock recompute
    // ------------------------------------------------------------------

    /// Recompute one material in its own transaction
    pub async fn recompute(&self, factory_id: Uuid, material_id: Uuid) -> AppResult<Material> {
        let mut tx = self.db.begin().await?;
        let material = Self::recompute_material(&mut tx, factory_id, material_id).await?;
        tx.commit().await?;
        Ok(material)
    }

    /// Overwrite a material's cached stock and average cost from its full
    /// purchase and usage history.
    pub async fn recompute_material(
        tx: &mut Transaction<'_, Postgres>,
        factory_id: Uuid,
        material_id: Uuid,
    ) -> AppResult<Material> {
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM materials WHERE id = $1 AND factory_id = $2 FOR UPDATE",
        )
        .bind(material_id)
        .bind(factory_id)
        .fetch_optional(&mut **tx)
        .await?;

        if locked.is_none() {
            return Err(AppError::NotFound("Material".to_string()));
        }

        let purchases = sqlx::query_as::<_, MaterialPurchase>(&format!(
            "SELECT {} FROM material_purchases WHERE material_id = $1 AND factory_id = $2",
            PURCHASE_COLUMNS
        ))
        .bind(material_id)
        .bind(factory_id)
        .fetch_all(&mut **tx)
        .await?;

        let usages = sqlx::query_as::<_, MaterialUsage>(&format!(
            "SELECT {} FROM material_usage WHERE material_id = $1 AND factory_id = $2",
            USAGE_COLUMNS
        ))
        .bind(material_id)
        .bind(factory_id)
        .fetch_all(&mut **tx)
        .await?;

        let position: StockPosition = recompute_stock(&purchases, &usages)?;

        let material = sqlx::query_as::<_, Material>(&format!(
            r#"
            UPDATE materials
            SET current_stock_qty = $1, average_cost_per_unit = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        ))
        .bind(position.quantity)
        .bind(position.average_cost)
        .bind(material_id)
        .fetch_one(&mut **tx)
        .await?;

        tracing::debug!(
            %material_id,
            purchases = purchases.len(),
            usages = usages.len(),
            quantity = %position.quantity,
            average_cost = %position.average_cost,
            "Material stock recomputed"
        );

        Ok(material)
    }

    async fn ensure_material(
        tx: &mut Transaction<'_, Postgres>,
        factory_id: Uuid,
        material_id: Uuid,
    ) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1 AND factory_id = $2)",
        )
        .bind(material_id)
        .bind(factory_id)
        .fetch_one(&mut **tx)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Material".to_string()));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Purchases
    // ------------------------------------------------------------------

    pub async fn list_purchases(
        &self,
        factory_id: Uuid,
        query: &MovementQuery,
    ) -> AppResult<Vec<MaterialPurchase>> {
        let purchases = sqlx::query_as::<_, MaterialPurchase>(&format!(
            r#"
            SELECT {} FROM material_purchases
            WHERE factory_id = $1
              AND ($2::uuid IS NULL OR material_id = $2)
              AND date BETWEEN $3 AND $4
            ORDER BY date DESC, created_at DESC
            "#,
            PURCHASE_COLUMNS
        ))
        .bind(factory_id)
        .bind(query.material_id)
        .bind(query.dates.start_or_min())
        .bind(query.dates.end_or_max())
        .fetch_all(&self.db)
        .await?;

        Ok(purchases)
    }

    pub async fn get_purchase(
        &self,
        factory_id: Uuid,
        purchase_id: Uuid,
    ) -> AppResult<MaterialPurchase> {
        sqlx::query_as::<_, MaterialPurchase>(&format!(
            "SELECT {} FROM material_purchases WHERE id = $1 AND factory_id = $2",
            PURCHASE_COLUMNS
        ))
        .bind(purchase_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))
    }

    pub async fn create_purchase(
        &self,
        factory_id: Uuid,
        input: CreatePurchaseInput,
    ) -> AppResult<MaterialPurchase> {
        validate_purchase(
            input.quantity_purchased,
            input.unit_cost,
            input.payment_made,
            &input.supplier_name,
        )?;

        let mut tx = self.db.begin().await?;
        Self::ensure_material(&mut tx, factory_id, input.material_id).await?;

        let purchase = sqlx::query_as::<_, MaterialPurchase>(&format!(
            r#"
            INSERT INTO material_purchases (
                factory_id, material_id, date, quantity_purchased, unit_cost,
                supplier_name, supplier_phone, payment_made, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            PURCHASE_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.material_id)
        .bind(input.date)
        .bind(input.quantity_purchased)
        .bind(input.unit_cost)
        .bind(input.supplier_name.trim())
        .bind(&input.supplier_phone)
        .bind(input.payment_made)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        Self::recompute_material(&mut tx, factory_id, purchase.material_id).await?;
        tx.commit().await?;

        tracing::info!(purchase_id = %purchase.id, material_id = %purchase.material_id, "Purchase recorded");

        Ok(purchase)
    }

    /// Update a purchase; moving it to another material refreshes both
    pub async fn update_purchase(
        &self,
        factory_id: Uuid,
        purchase_id: Uuid,
        input: UpdatePurchaseInput,
    ) -> AppResult<MaterialPurchase> {
        let mut tx = self.db.begin().await?;
        let existing = sqlx::query_as::<_, MaterialPurchase>(&format!(
            "SELECT {} FROM material_purchases WHERE id = $1 AND factory_id = $2 FOR UPDATE",
            PURCHASE_COLUMNS
        ))
        .bind(purchase_id)
        .bind(factory_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let material_id = input.material_id.unwrap_or(existing.material_id);
        let quantity = input.quantity_purchased.unwrap_or(existing.quantity_purchased);
        let unit_cost = input.unit_cost.unwrap_or(existing.unit_cost);
        let payment_made = input.payment_made.unwrap_or(existing.payment_made);
        let supplier_name = input.supplier_name.unwrap_or(existing.supplier_name);
        validate_purchase(quantity, unit_cost, payment_made, &supplier_name)?;

        Self::ensure_material(&mut tx, factory_id, material_id).await?;

        let purchase = sqlx::query_as::<_, MaterialPurchase>(&format!(
            r#"
            UPDATE material_purchases
            SET material_id = $1, date = $2, quantity_purchased = $3, unit_cost = $4,
                supplier_name = $5, supplier_phone = $6, payment_made = $7, notes = $8,
                updated_at = NOW()
            WHERE id = $9 AND factory_id = $10
            RETURNING {}
            "#,
            PURCHASE_COLUMNS
        ))
        .bind(material_id)
        .bind(input.date.unwrap_or(existing.date))
        .bind(quantity)
        .bind(unit_cost)
        .bind(supplier_name.trim())
        .bind(input.supplier_phone.or(existing.supplier_phone))
        .bind(payment_made)
        .bind(input.notes.or(existing.notes))
        .bind(purchase_id)
        .bind(factory_id)
        .fetch_one(&mut *tx)
        .await?;

        for id in affected_materials(existing.material_id, material_id) {
            Self::recompute_material(&mut tx, factory_id, id).await?;
        }
        tx.commit().await?;

        Ok(purchase)
    }

    pub async fn delete_purchase(&self, factory_id: Uuid, purchase_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let material_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM material_purchases WHERE id = $1 AND factory_id = $2 RETURNING material_id",
        )
        .bind(purchase_id)
        .bind(factory_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        Self::recompute_material(&mut tx, factory_id, material_id).await?;
        tx.commit().await?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Usage
    // ------------------------------------------------------------------

    pub async fn list_usage(
        &self,
        factory_id: Uuid,
        query: &MovementQuery,
    ) -> AppResult<Vec<MaterialUsage>> {
        let usage = sqlx::query_as::<_, MaterialUsage>(&format!(
            r#"
            SELECT {} FROM material_usage
            WHERE factory_id = $1
              AND ($2::uuid IS NULL OR material_id = $2)
              AND date BETWEEN $3 AND $4
            ORDER BY date DESC, created_at DESC
            "#,
            USAGE_COLUMNS
        ))
        .bind(factory_id)
        .bind(query.material_id)
        .bind(query.dates.start_or_min())
        .bind(query.dates.end_or_max())
        .fetch_all(&self.db)
        .await?;

        Ok(usage)
    }

    pub async fn get_usage(&self, factory_id: Uuid, usage_id: Uuid) -> AppResult<MaterialUsage> {
        sqlx::query_as::<_, MaterialUsage>(&format!(
            "SELECT {} FROM material_usage WHERE id = $1 AND factory_id = $2",
            USAGE_COLUMNS
        ))
        .bind(usage_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Usage".to_string()))
    }

    pub async fn create_usage(
        &self,
        factory_id: Uuid,
        input: CreateUsageInput,
    ) -> AppResult<MaterialUsage> {
        validate_usage(input.quantity_used, &input.purpose)?;

        let mut tx = self.db.begin().await?;
        Self::ensure_material(&mut tx, factory_id, input.material_id).await?;

        let usage = sqlx::query_as::<_, MaterialUsage>(&format!(
            r#"
            INSERT INTO material_usage (factory_id, material_id, date, quantity_used, purpose)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USAGE_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.material_id)
        .bind(input.date)
        .bind(input.quantity_used)
        .bind(input.purpose.trim())
        .fetch_one(&mut *tx)
        .await?;

        let material = Self::recompute_material(&mut tx, factory_id, usage.material_id).await?;
        tx.commit().await?;

        if material.is_out_of_stock() {
            tracing::warn!(
                material_id = %material.id,
                stock = %material.current_stock_qty,
                "Usage recorded beyond available stock"
            );
        }

        Ok(usage)
    }

    pub async fn update_usage(
        &self,
        factory_id: Uuid,
        usage_id: Uuid,
        input: UpdateUsageInput,
    ) -> AppResult<MaterialUsage> {
        let mut tx = self.db.begin().await?;
        let existing = sqlx::query_as::<_, MaterialUsage>(&format!(
            "SELECT {} FROM material_usage WHERE id = $1 AND factory_id = $2 FOR UPDATE",
            USAGE_COLUMNS
        ))
        .bind(usage_id)
        .bind(factory_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Usage".to_string()))?;

        let material_id = input.material_id.unwrap_or(existing.material_id);
        let quantity = input.quantity_used.unwrap_or(existing.quantity_used);
        let purpose = input.purpose.unwrap_or(existing.purpose);
        validate_usage(quantity, &purpose)?;

        Self::ensure_material(&mut tx, factory_id, material_id).await?;

        let usage = sqlx::query_as::<_, MaterialUsage>(&format!(
            r#"
            UPDATE material_usage
            SET material_id = $1, date = $2, quantity_used = $3, purpose = $4, updated_at = NOW()
            WHERE id = $5 AND factory_id = $6
            RETURNING {}
            "#,
            USAGE_COLUMNS
        ))
        .bind(material_id)
        .bind(input.date.unwrap_or(existing.date))
        .bind(quantity)
        .bind(purpose.trim())
        .bind(usage_id)
        .bind(factory_id)
        .fetch_one(&mut *tx)
        .await?;

        for id in affected_materials(existing.material_id, material_id) {
            Self::recompute_material(&mut tx, factory_id, id).await?;
        }
        tx.commit().await?;

        Ok(usage)
    }

    pub async fn delete_usage(&self, factory_id: Uuid, usage_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let material_id = sqlx::query_scalar::<_, Uuid>(
            "DELETE FROM material_usage WHERE id = $1 AND factory_id = $2 RETURNING material_id",
        )
        .bind(usage_id)
        .bind(factory_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Usage".to_string()))?;

        Self::recompute_material(&mut tx, factory_id, material_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Material id to name, for reports and exports
    pub async fn material_names(
        &self,
        factory_id: Uuid,
    ) -> AppResult<std::collections::HashMap<Uuid, String>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, material_name FROM materials WHERE factory_id = $1",
        )
        .bind(factory_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
