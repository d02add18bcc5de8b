//! Reporting service: period profit and loss and the detailed CSV export

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::format::format_report_date;
use shared::ledger::{build_report, ProfitLossReport, ReportInput};
use shared::models::{
    EmployeePayment, MaterialPurchase, MaterialUsage, OtherExpense, PieceRates, ProductionLog, Sale,
};
use shared::types::{DateFilter, DateRange};
use sqlx::PgPool;
use uuid::Uuid;

use super::material::MovementQuery;
use super::sale::SaleQuery;
use super::{
    ExpenseService, MaterialService, PayrollService, ProductionService, RateService, SaleService,
};
use crate::error::{AppError, AppResult};

const REPORT_TITLE: &str = "BricksFlow - Detailed Report";

/// Query string of the report endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReportQuery {
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
}

impl ReportQuery {
    pub fn range(&self) -> AppResult<DateRange> {
        shared::validation::validate_date_range(self.start_date, self.end_date)
            .map_err(|m| AppError::validation("end_date", m))?;
        Ok(DateRange::new(self.start_date, self.end_date))
    }
}

/// Every row of one reporting period
#[derive(Debug, Clone, Default)]
pub struct ReportDataset {
    pub production: Vec<ProductionLog>,
    pub sales: Vec<Sale>,
    pub purchases: Vec<MaterialPurchase>,
    pub usages: Vec<MaterialUsage>,
    pub payments: Vec<EmployeePayment>,
    pub expenses: Vec<OtherExpense>,
    pub material_names: HashMap<Uuid, String>,
    pub product_names: HashMap<Uuid, String>,
}

impl ReportDataset {
    pub fn input(&self, period: DateRange, rates: PieceRates) -> ReportInput<'_> {
        ReportInput {
            period,
            production: &self.production,
            sales: &self.sales,
            purchases: &self.purchases,
            usages: &self.usages,
            payments: &self.payments,
            expenses: &self.expenses,
            material_names: &self.material_names,
            rates,
        }
    }

    fn material(&self, id: Uuid) -> &str {
        self.material_names.get(&id).map(String::as_str).unwrap_or("Unknown")
    }

    fn product(&self, id: Uuid) -> &str {
        self.product_names.get(&id).map(String::as_str).unwrap_or("Unknown")
    }
}

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Load all rows of the period, oldest first
    pub async fn dataset(&self, factory_id: Uuid, period: DateRange) -> AppResult<ReportDataset> {
        let dates = DateFilter::from(period);
        let materials = MaterialService::new(self.db.clone());
        let production = ProductionService::new(self.db.clone());
        let movements = MovementQuery { material_id: None, dates };

        let mut dataset = ReportDataset {
            production: production.list_logs(factory_id, &dates).await?,
            sales: SaleService::new(self.db.clone())
                .list_sales(factory_id, &SaleQuery { customer_name: None, dates })
                .await?,
            purchases: materials.list_purchases(factory_id, &movements).await?,
            usages: materials.list_usage(factory_id, &movements).await?,
            payments: PayrollService::new(self.db.clone()).list_payments(factory_id, &dates).await?,
            expenses: ExpenseService::new(self.db.clone()).list(factory_id, &dates).await?,
            material_names: materials.material_names(factory_id).await?,
            product_names: production
                .list_products(factory_id)
                .await?
                .into_iter()
                .map(|p| (p.id, p.name))
                .collect(),
        };

        // list endpoints return newest first; the report reads chronologically
        dataset.production.reverse();
        dataset.sales.reverse();
        dataset.purchases.reverse();
        dataset.usages.reverse();
        dataset.payments.reverse();
        dataset.expenses.reverse();

        Ok(dataset)
    }

    /// Profit and loss for the period
    pub async fn profit_loss(
        &self,
        factory_id: Uuid,
        period: DateRange,
        defaults: PieceRates,
    ) -> AppResult<ProfitLossReport> {
        let dataset = self.dataset(factory_id, period).await?;
        let rates = RateService::new(self.db.clone()).piece_rates(factory_id, defaults).await?;
        let report = build_report(&dataset.input(period, rates))?;

        tracing::info!(
            %factory_id,
            start = %period.start,
            end = %period.end,
            revenue = %report.sales.total_revenue,
            net_profit = %report.net_profit,
            "Profit and loss report generated"
        );

        Ok(report)
    }

    /// Detailed CSV export of the period
    pub async fn export(
        &self,
        factory_id: Uuid,
        period: DateRange,
        defaults: PieceRates,
    ) -> AppResult<String> {
        let dataset = self.dataset(factory_id, period).await?;
        let rates = RateService::new(self.db.clone()).piece_rates(factory_id, defaults).await?;
        let report = build_report(&dataset.input(period, rates))?;

        let csv = export_csv(&report, &dataset)?;
        tracing::info!(%factory_id, bytes = csv.len(), "Report exported");

        Ok(csv)
    }
}

/// Download name of a period's CSV export
pub fn export_file_name(period: DateRange) -> String {
    format!("brickworks-report-{}-to-{}.csv", period.start, period.end)
}

fn amount(value: Decimal) -> String {
    value.round_dp(2).normalize().to_string()
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Write `rows` under a section banner and header line
fn section<I>(out: &mut String, title: &str, header: &[&str], rows: I) -> AppResult<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_writer(vec![]);

    if !header.is_empty() {
        wtr.write_record(header).map_err(csv_error)?;
    }
    for row in rows {
        wtr.write_record(&row).map_err(csv_error)?;
    }

    let body = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    let body = String::from_utf8(body)
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;

    out.push('\n');
    out.push_str(&format!("=== {} ===\n", title));
    out.push_str(&body);
    Ok(())
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV serialization error: {}", e))
}

/// Render the detailed report as CSV
///
/// Sections follow one another separated by a blank line.
pub fn export_csv(report: &ProfitLossReport, data: &ReportDataset) -> AppResult<String> {
    let mut out = String::new();
    out.push_str(REPORT_TITLE);
    out.push('\n');
    out.push_str(&format!(
        "Period: {} to {}\n",
        format_report_date(report.period.start),
        format_report_date(report.period.end)
    ));

    section(
        &mut out,
        "SUMMARY",
        &[],
        [
            ("Net Profit", report.net_profit),
            ("Total Revenue", report.sales.total_revenue),
            ("Total COGS", report.cogs.total),
            ("Total Payments", report.payments.total),
            ("Total Expenses", report.expenses.total),
        ]
        .into_iter()
        .map(|(label, value)| vec![label.to_string(), amount(value)]),
    )?;

    section(
        &mut out,
        "PRODUCTION RECORDS",
        &["Date", "Product", "Quantity", "Punches", "Remarks"],
        data.production.iter().map(|log| {
            vec![
                log.date.to_string(),
                log.product_name.clone(),
                log.quantity.to_string(),
                log.punches.map(|p| p.to_string()).unwrap_or_default(),
                opt(&log.remarks),
            ]
        }),
    )?;

    section(
        &mut out,
        "SALES RECORDS",
        &[
            "Date", "Customer", "Phone", "Product", "Quantity", "Rate", "Total", "Received",
            "Balance", "Notes",
        ],
        data.sales.iter().map(|sale| {
            vec![
                sale.date.to_string(),
                sale.customer_name.clone(),
                opt(&sale.customer_phone),
                data.product(sale.product_id).to_string(),
                sale.quantity_sold.to_string(),
                amount(sale.rate_per_unit),
                amount(sale.total_amount),
                amount(sale.amount_received),
                amount(sale.balance_due),
                opt(&sale.notes),
            ]
        }),
    )?;

    let purchase_rows = data
        .purchases
        .iter()
        .map(|p| -> AppResult<Vec<String>> {
            Ok(vec![
                p.date.to_string(),
                data.material(p.material_id).to_string(),
                p.supplier_name.clone(),
                amount(p.quantity_purchased),
                amount(p.unit_cost),
                amount(p.total_cost()?),
                amount(p.payment_made),
                opt(&p.notes),
            ])
        })
        .collect::<AppResult<Vec<_>>>()?;
    section(
        &mut out,
        "MATERIAL PURCHASES",
        &[
            "Date", "Material", "Supplier", "Quantity", "Unit Cost", "Total Cost", "Payment Made",
            "Notes",
        ],
        purchase_rows,
    )?;

    section(
        &mut out,
        "MATERIAL USAGE",
        &["Date", "Material", "Quantity", "Purpose"],
        data.usages.iter().map(|u| {
            vec![
                u.date.to_string(),
                data.material(u.material_id).to_string(),
                amount(u.quantity_used),
                u.purpose.clone(),
            ]
        }),
    )?;

    section(
        &mut out,
        "EMPLOYEE PAYMENTS",
        &["Date", "Employee", "Type", "Amount", "Notes"],
        data.payments.iter().map(|p| {
            vec![
                p.date.to_string(),
                p.employee_name.clone(),
                p.payment_type.clone(),
                amount(p.amount),
                opt(&p.notes),
            ]
        }),
    )?;

    section(
        &mut out,
        "OTHER EXPENSES",
        &["Date", "Type", "Description", "Amount", "Vendor", "Receipt", "Notes"],
        data.expenses.iter().map(|e| {
            vec![
                e.date.to_string(),
                e.expense_type.clone(),
                e.description.clone(),
                amount(e.amount),
                opt(&e.vendor_name),
                opt(&e.receipt_number),
                opt(&e.notes),
            ]
        }),
    )?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn period() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
    }

    fn expense(expense_type: &str, description: &str, amount: i64) -> OtherExpense {
        OtherExpense {
            id: Uuid::new_v4(),
            factory_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            expense_type: expense_type.to_string(),
            description: description.to_string(),
            amount: Decimal::from(amount),
            vendor_name: None,
            receipt_number: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn render(data: &ReportDataset) -> String {
        let report = build_report(&data.input(period(), PieceRates::default())).unwrap();
        export_csv(&report, data).unwrap()
    }

    #[test]
    fn test_export_layout() {
        let csv = render(&ReportDataset::default());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "BricksFlow - Detailed Report");
        assert_eq!(lines[1], "Period: 1 Mar 2024 to 31 Mar 2024");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "=== SUMMARY ===");
        assert_eq!(lines[4], "Net Profit,0");

        for header in [
            "Date,Product,Quantity,Punches,Remarks",
            "Date,Customer,Phone,Product,Quantity,Rate,Total,Received,Balance,Notes",
            "Date,Material,Supplier,Quantity,Unit Cost,Total Cost,Payment Made,Notes",
            "Date,Material,Quantity,Purpose",
            "Date,Employee,Type,Amount,Notes",
            "Date,Type,Description,Amount,Vendor,Receipt,Notes",
        ] {
            assert!(lines.contains(&header), "missing header {}", header);
        }
    }

    #[test]
    fn test_sections_are_separated_by_blank_lines() {
        let csv = render(&ReportDataset::default());
        let lines: Vec<&str> = csv.lines().collect();

        for (i, line) in lines.iter().enumerate() {
            if line.starts_with("===") {
                assert_eq!(lines[i - 1], "", "no blank line before {}", line);
            }
        }
        assert_eq!(lines.iter().filter(|l| l.starts_with("===")).count(), 7);
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let data = ReportDataset {
            expenses: vec![expense("transport", "Diesel, tractor", 1500)],
            ..Default::default()
        };
        let csv = render(&data);

        assert!(csv.contains("2024-03-05,transport,\"Diesel, tractor\",1500,,,"));
        assert!(csv.contains("Total Expenses,1500"));
        assert!(csv.contains("Net Profit,-1500"));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name(period()),
            "brickworks-report-2024-03-01-to-2024-03-31.csv"
        );
    }

    #[test]
    fn test_report_query_rejects_inverted_range() {
        let query = ReportQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };
        assert!(query.range().is_err());
    }
}
