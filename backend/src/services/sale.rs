//! Sales service: invoices, customer payments and receivables
//!
//! Payments are spread over a customer's open invoices oldest first. The
//! allocation and all invoice updates happen in one transaction, with the
//! customer's open invoices locked for its duration.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::ledger::{
    allocate_payment, customer_key, customer_statement, customer_summaries, Allocation,
    CustomerFilter, CustomerStatement, InvoiceAdjustment, OpenInvoice,
};
use shared::models::{CustomerSummary, Sale};
use shared::types::DateFilter;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const SALE_COLUMNS: &str = "id, factory_id, date, customer_name, customer_phone, product_id, \
     quantity_sold, rate_per_unit, total_amount, amount_received, balance_due, notes, \
     created_at, updated_at";

/// Sales service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub date: NaiveDate,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub product_id: Uuid,
    pub quantity_sold: i32,
    pub rate_per_unit: Decimal,
    #[serde(default)]
    pub amount_received: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSaleInput {
    pub date: Option<NaiveDate>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub product_id: Option<Uuid>,
    pub quantity_sold: Option<i32>,
    pub rate_per_unit: Option<Decimal>,
    pub amount_received: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleQuery {
    pub customer_name: Option<String>,
    #[serde(flatten)]
    pub dates: DateFilter,
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentInput {
    pub customer_name: String,
    pub amount: Decimal,
}

/// A new sale and, when more was received than billed, where the excess went
#[derive(Debug, Serialize)]
pub struct SaleCreated {
    pub sale: Sale,
    pub invoice_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carried_over: Option<Allocation>,
}

/// Result of applying a customer payment
#[derive(Debug, Serialize)]
pub struct PaymentApplied {
    pub customer_name: String,
    pub amount: Decimal,
    pub allocation: Allocation,
}

/// Money taken against a new sale: what stays on the sale and what spills
/// over to older invoices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedSplit {
    pub amount_received: Decimal,
    pub balance_due: Decimal,
    pub excess: Decimal,
}

impl ReceivedSplit {
    pub fn of(total_amount: Decimal, received: Decimal) -> Self {
        if received > total_amount {
            Self {
                amount_received: total_amount,
                balance_due: Decimal::ZERO,
                excess: received - total_amount,
            }
        } else {
            Self {
                amount_received: received,
                balance_due: total_amount - received,
                excess: Decimal::ZERO,
            }
        }
    }
}

/// Money and product fields of an edited sale, merged over the stored row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleEdit {
    pub customer_name: String,
    pub product_id: Uuid,
    pub quantity_sold: i32,
    pub rate_per_unit: Decimal,
    pub total_amount: Decimal,
    pub amount_received: Decimal,
    pub balance_due: Decimal,
}

impl SaleEdit {
    pub fn merge(existing: &Sale, input: &UpdateSaleInput) -> AppResult<Self> {
        let quantity_sold = input.quantity_sold.unwrap_or(existing.quantity_sold);
        let rate_per_unit = input.rate_per_unit.unwrap_or(existing.rate_per_unit);
        let amount_received = input.amount_received.unwrap_or(existing.amount_received);
        let customer_name = input
            .customer_name
            .clone()
            .unwrap_or_else(|| existing.customer_name.clone());
        validate_sale(&customer_name, quantity_sold, rate_per_unit, amount_received)?;

        let total_amount = if input.quantity_sold.is_some() || input.rate_per_unit.is_some() {
            Sale::compute_total(quantity_sold, rate_per_unit)?
        } else {
            existing.total_amount
        };

        if amount_received > total_amount {
            return Err(AppError::validation(
                "amount_received",
                "Amount received cannot exceed the sale total; record extra money as a payment",
            ));
        }

        Ok(Self {
            customer_name,
            product_id: input.product_id.unwrap_or(existing.product_id),
            quantity_sold,
            rate_per_unit,
            total_amount,
            amount_received,
            balance_due: total_amount - amount_received,
        })
    }
}

fn validate_sale(
    customer_name: &str,
    quantity_sold: i32,
    rate_per_unit: Decimal,
    amount_received: Decimal,
) -> AppResult<()> {
    use shared::validation::{
        validate_amount_received, validate_non_negative, validate_quantity, validate_required,
    };

    validate_required(customer_name).map_err(|m| AppError::validation("customer_name", m))?;
    validate_quantity(quantity_sold).map_err(|m| AppError::validation("quantity_sold", m))?;
    validate_non_negative(rate_per_unit).map_err(|m| AppError::validation("rate_per_unit", m))?;
    validate_amount_received(amount_received)
        .map_err(|m| AppError::validation("amount_received", m))?;
    Ok(())
}

impl SaleService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list_sales(&self, factory_id: Uuid, query: &SaleQuery) -> AppResult<Vec<Sale>> {
        let customer = query.customer_name.as_deref().map(customer_key);

        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {} FROM sales
            WHERE factory_id = $1
              AND ($2::text IS NULL OR LOWER(TRIM(customer_name)) = $2)
              AND date BETWEEN $3 AND $4
            ORDER BY date DESC, created_at DESC
            "#,
            SALE_COLUMNS
        ))
        .bind(factory_id)
        .bind(customer)
        .bind(query.dates.start_or_min())
        .bind(query.dates.end_or_max())
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }

    pub async fn get_sale(&self, factory_id: Uuid, sale_id: Uuid) -> AppResult<Sale> {
        sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE id = $1 AND factory_id = $2",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .bind(factory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))
    }

    /// Record a sale
    ///
    /// The total is fixed at `quantity * rate`. Receiving more than the total
    /// marks the sale paid and applies the excess to the customer's older
    /// open invoices.
    pub async fn create_sale(&self, factory_id: Uuid, input: CreateSaleInput) -> AppResult<SaleCreated> {
        validate_sale(
            &input.customer_name,
            input.quantity_sold,
            input.rate_per_unit,
            input.amount_received,
        )?;

        let total_amount = Sale::compute_total(input.quantity_sold, input.rate_per_unit)?;
        let split = ReceivedSplit::of(total_amount, input.amount_received);

        let mut tx = self.db.begin().await?;
        Self::ensure_product(&mut tx, factory_id, input.product_id).await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            INSERT INTO sales (
                factory_id, date, customer_name, customer_phone, product_id, quantity_sold,
                rate_per_unit, total_amount, amount_received, balance_due, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(factory_id)
        .bind(input.date)
        .bind(input.customer_name.trim())
        .bind(&input.customer_phone)
        .bind(input.product_id)
        .bind(input.quantity_sold)
        .bind(input.rate_per_unit)
        .bind(total_amount)
        .bind(split.amount_received)
        .bind(split.balance_due)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let carried_over = if split.excess > Decimal::ZERO {
            let allocation =
                Self::allocate_in_tx(&mut tx, factory_id, &sale.customer_name, split.excess, Some(sale.id))
                    .await?;
            Some(allocation)
        } else {
            None
        };

        tx.commit().await?;

        tracing::info!(
            sale_id = %sale.id,
            total = %sale.total_amount,
            excess = %split.excess,
            "Sale recorded"
        );

        Ok(SaleCreated {
            invoice_number: sale.invoice_number(),
            sale,
            carried_over,
        })
    }

    /// Edit a sale; the total is recomputed only when quantity or rate change
    ///
    /// The row stays locked `FOR UPDATE` from read to write, so the stored
    /// `amount_received` already includes any payment applied before the edit.
    pub async fn update_sale(
        &self,
        factory_id: Uuid,
        sale_id: Uuid,
        input: UpdateSaleInput,
    ) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;
        let existing = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE id = $1 AND factory_id = $2 FOR UPDATE",
            SALE_COLUMNS
        ))
        .bind(sale_id)
        .bind(factory_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        let edit = SaleEdit::merge(&existing, &input)?;
        Self::ensure_product(&mut tx, factory_id, edit.product_id).await?;

        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            UPDATE sales
            SET date = $1, customer_name = $2, customer_phone = $3, product_id = $4,
                quantity_sold = $5, rate_per_unit = $6, total_amount = $7,
                amount_received = $8, balance_due = $9, notes = $10, updated_at = NOW()
            WHERE id = $11 AND factory_id = $12
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(input.date.unwrap_or(existing.date))
        .bind(edit.customer_name.trim())
        .bind(input.customer_phone.or(existing.customer_phone))
        .bind(edit.product_id)
        .bind(edit.quantity_sold)
        .bind(edit.rate_per_unit)
        .bind(edit.total_amount)
        .bind(edit.amount_received)
        .bind(edit.balance_due)
        .bind(input.notes.or(existing.notes))
        .bind(sale_id)
        .bind(factory_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(sale)
    }

    pub async fn delete_sale(&self, factory_id: Uuid, sale_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1 AND factory_id = $2")
            .bind(sale_id)
            .bind(factory_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Sale".to_string()));
        }

        Ok(())
    }

    /// Apply a customer payment to their open invoices, oldest first
    ///
    /// Any amount left after every invoice is settled is reported back and
    /// not stored.
    pub async fn apply_payment(
        &self,
        factory_id: Uuid,
        input: RecordPaymentInput,
    ) -> AppResult<PaymentApplied> {
        shared::validation::validate_required(&input.customer_name)
            .map_err(|m| AppError::validation("customer_name", m))?;
        shared::validation::validate_positive_amount(input.amount)
            .map_err(|m| AppError::validation("amount", m))?;

        let mut tx = self.db.begin().await?;
        let allocation =
            Self::allocate_in_tx(&mut tx, factory_id, &input.customer_name, input.amount, None).await?;
        tx.commit().await?;

        Ok(PaymentApplied {
            customer_name: input.customer_name.trim().to_string(),
            amount: input.amount,
            allocation,
        })
    }

    async fn allocate_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        factory_id: Uuid,
        customer_name: &str,
        amount: Decimal,
        exclude: Option<Uuid>,
    ) -> AppResult<Allocation> {
        let open = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {} FROM sales
            WHERE factory_id = $1 AND LOWER(TRIM(customer_name)) = $2 AND balance_due > 0
            ORDER BY date ASC, created_at ASC, id ASC
            FOR UPDATE
            "#,
            SALE_COLUMNS
        ))
        .bind(factory_id)
        .bind(customer_key(customer_name))
        .fetch_all(&mut **tx)
        .await?;

        let invoices: Vec<OpenInvoice> = open.iter().map(OpenInvoice::from).collect();
        let allocation = allocate_payment(&invoices, amount, exclude)?;

        Self::apply_adjustments(tx, factory_id, &allocation.adjustments).await?;

        if allocation.unapplied > Decimal::ZERO {
            tracing::warn!(
                %factory_id,
                customer = customer_name,
                unapplied = %allocation.unapplied,
                "Payment exceeds outstanding balance"
            );
        }

        tracing::info!(
            %factory_id,
            customer = customer_name,
            applied = %allocation.applied,
            invoices = allocation.adjustments.len(),
            "Payment allocated"
        );

        Ok(allocation)
    }

    async fn apply_adjustments(
        tx: &mut Transaction<'_, Postgres>,
        factory_id: Uuid,
        adjustments: &[InvoiceAdjustment],
    ) -> AppResult<()> {
        for adjustment in adjustments {
            sqlx::query(
                r#"
                UPDATE sales
                SET amount_received = $1, balance_due = $2, updated_at = NOW()
                WHERE id = $3 AND factory_id = $4
                "#,
            )
            .bind(adjustment.new_amount_received)
            .bind(adjustment.new_balance_due)
            .bind(adjustment.sale_id)
            .bind(factory_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn ensure_product(
        tx: &mut Transaction<'_, Postgres>,
        factory_id: Uuid,
        product_id: Uuid,
    ) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_definitions WHERE id = $1 AND factory_id = $2)",
        )
        .bind(product_id)
        .bind(factory_id)
        .fetch_one(&mut **tx)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    /// Per-customer totals, largest first
    pub async fn customers(
        &self,
        factory_id: Uuid,
        filter: &CustomerFilter,
    ) -> AppResult<Vec<CustomerSummary>> {
        let sales = self.all_sales(factory_id).await?;
        Ok(filter.apply(customer_summaries(&sales)))
    }

    /// Running-balance statement for one customer
    pub async fn statement(&self, factory_id: Uuid, customer_name: &str) -> AppResult<CustomerStatement> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE factory_id = $1 AND LOWER(TRIM(customer_name)) = $2",
            SALE_COLUMNS
        ))
        .bind(factory_id)
        .bind(customer_key(customer_name))
        .fetch_all(&self.db)
        .await?;

        if sales.is_empty() {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        Ok(customer_statement(customer_name, &sales))
    }

    /// Full sales history, oldest first
    async fn all_sales(&self, factory_id: Uuid) -> AppResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {} FROM sales WHERE factory_id = $1 ORDER BY date ASC, created_at ASC",
            SALE_COLUMNS
        ))
        .bind(factory_id)
        .fetch_all(&self.db)
        .await?;

        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_under_total() {
        let split = ReceivedSplit::of(Decimal::from(1000), Decimal::from(400));
        assert_eq!(split.amount_received, Decimal::from(400));
        assert_eq!(split.balance_due, Decimal::from(600));
        assert_eq!(split.excess, Decimal::ZERO);
    }

    #[test]
    fn test_split_over_total_caps_sale() {
        let split = ReceivedSplit::of(Decimal::from(1000), Decimal::from(1300));
        assert_eq!(split.amount_received, Decimal::from(1000));
        assert_eq!(split.balance_due, Decimal::ZERO);
        assert_eq!(split.excess, Decimal::from(300));
    }

    #[test]
    fn test_split_exact() {
        let split = ReceivedSplit::of(Decimal::from(750), Decimal::from(750));
        assert_eq!(split.balance_due, Decimal::ZERO);
        assert_eq!(split.excess, Decimal::ZERO);
    }

    #[test]
    fn test_sale_validation() {
        assert!(validate_sale("Anil", 100, Decimal::from(8), Decimal::ZERO).is_ok());
        assert!(validate_sale("", 100, Decimal::from(8), Decimal::ZERO).is_err());
        assert!(validate_sale("Anil", 0, Decimal::from(8), Decimal::ZERO).is_err());
        assert!(validate_sale("Anil", 100, Decimal::from(-8), Decimal::ZERO).is_err());
        assert!(validate_sale("Anil", 100, Decimal::from(8), Decimal::from(-1)).is_err());
    }

    fn stored_sale(total: i64, received: i64) -> Sale {
        let now = chrono::Utc::now();
        Sale {
            id: Uuid::new_v4(),
            factory_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            customer_name: "Ramesh".to_string(),
            customer_phone: None,
            product_id: Uuid::new_v4(),
            quantity_sold: 1000,
            rate_per_unit: Decimal::from(total) / Decimal::from(1000),
            total_amount: Decimal::from(total),
            amount_received: Decimal::from(received),
            balance_due: Decimal::from(total - received),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn no_changes() -> UpdateSaleInput {
        UpdateSaleInput {
            date: None,
            customer_name: None,
            customer_phone: None,
            product_id: None,
            quantity_sold: None,
            rate_per_unit: None,
            amount_received: None,
            notes: None,
        }
    }

    #[test]
    fn test_edit_keeps_payment_already_on_the_row() {
        // A payment of 3000 landed after the sale was first shown to the user
        let stored = stored_sale(8000, 3000);
        let input = UpdateSaleInput { notes: Some("delivered".to_string()), ..no_changes() };

        let edit = SaleEdit::merge(&stored, &input).unwrap();
        assert_eq!(edit.amount_received, Decimal::from(3000));
        assert_eq!(edit.balance_due, Decimal::from(5000));
        assert_eq!(edit.total_amount, Decimal::from(8000));
    }

    #[test]
    fn test_edit_recomputes_total_on_rate_change() {
        let stored = stored_sale(8000, 3000);
        let input = UpdateSaleInput { rate_per_unit: Some(Decimal::from(9)), ..no_changes() };

        let edit = SaleEdit::merge(&stored, &input).unwrap();
        assert_eq!(edit.total_amount, Decimal::from(9000));
        assert_eq!(edit.balance_due, Decimal::from(6000));
    }

    #[test]
    fn test_edit_below_received_rejected() {
        let stored = stored_sale(8000, 3000);
        let input = UpdateSaleInput { quantity_sold: Some(100), ..no_changes() };
        assert!(matches!(
            SaleEdit::merge(&stored, &input),
            Err(AppError::Validation { .. })
        ));
    }
}
