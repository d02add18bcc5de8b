//! Dashboard figures for the current month

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::format::format_inr;
use shared::types::DateRange;
use sqlx::PgPool;
use uuid::Uuid;

use super::material::InventoryValuation;
use super::MaterialService;
use crate::error::AppResult;

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub month: DateRange,
    pub month_revenue: Decimal,
    pub month_revenue_display: String,
    pub month_production: i64,
    pub month_sale_count: i64,
    pub outstanding_receivables: Decimal,
    pub outstanding_receivables_display: String,
    pub customers_with_dues: i64,
    pub inventory_value: Decimal,
    pub inventory_value_display: String,
    pub out_of_stock_materials: usize,
}

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

impl DashboardService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Metrics for the month containing `today`
    pub async fn metrics(&self, factory_id: Uuid, today: NaiveDate) -> AppResult<DashboardMetrics> {
        let month = DateRange::month_of(today);

        let (month_revenue, month_sale_count): (Decimal, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM sales
            WHERE factory_id = $1 AND date BETWEEN $2 AND $3
            "#,
        )
        .bind(factory_id)
        .bind(month.start)
        .bind(month.end)
        .fetch_one(&self.db)
        .await?;

        let month_production: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::BIGINT
            FROM production_logs
            WHERE factory_id = $1 AND date BETWEEN $2 AND $3
            "#,
        )
        .bind(factory_id)
        .bind(month.start)
        .bind(month.end)
        .fetch_one(&self.db)
        .await?;

        // Receivables are all-time, not just this month
        let (outstanding_receivables, customers_with_dues): (Decimal, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(balance_due), 0),
                   COUNT(DISTINCT LOWER(TRIM(customer_name))) FILTER (WHERE balance_due > 0)
            FROM sales
            WHERE factory_id = $1 AND balance_due > 0
            "#,
        )
        .bind(factory_id)
        .fetch_one(&self.db)
        .await?;

        let InventoryValuation { total_value, out_of_stock_count, .. } =
            MaterialService::new(self.db.clone()).valuation(factory_id).await?;

        Ok(DashboardMetrics {
            month,
            month_revenue,
            month_revenue_display: format_inr(month_revenue),
            month_production,
            month_sale_count,
            outstanding_receivables,
            outstanding_receivables_display: format_inr(outstanding_receivables),
            customers_with_dues,
            inventory_value: total_value,
            inventory_value_display: format_inr(total_value),
            out_of_stock_materials: out_of_stock_count,
        })
    }
}
