//! Period profit and loss

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{checked_add, checked_mul, checked_sub, checked_sum, LedgerError};
use crate::models::{
    EmployeePayment, ExpenseCategory, MaterialPurchase, MaterialUsage, OtherExpense, PaymentType,
    PieceRates, ProductionLog, Sale,
};
use crate::types::DateRange;

const UNKNOWN: &str = "Unknown";

/// Rows of one reporting period, already filtered to the period's dates
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub period: DateRange,
    pub production: &'a [ProductionLog],
    pub sales: &'a [Sale],
    pub purchases: &'a [MaterialPurchase],
    pub usages: &'a [MaterialUsage],
    pub payments: &'a [EmployeePayment],
    pub expenses: &'a [OtherExpense],
    /// Material id to display name
    pub material_names: &'a HashMap<Uuid, String>,
    pub rates: PieceRates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductTotal {
    pub name: String,
    pub quantity: i64,
    pub punches: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSummary {
    pub total_punches: i64,
    pub total_quantity: i64,
    pub by_product: Vec<ProductTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_revenue: Decimal,
    pub total_quantity_sold: i64,
    pub outstanding_balance: Decimal,
    pub sale_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTotal {
    pub name: String,
    pub quantity: Decimal,
    /// Zero for usage lines
    pub cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialsSummary {
    pub purchased: Vec<MaterialTotal>,
    pub used: Vec<MaterialTotal>,
    pub total_purchase_cost: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentsSummary {
    pub salary: Decimal,
    pub advance: Decimal,
    pub bonus: Decimal,
    pub incentive: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostOfGoods {
    pub material_cost: Decimal,
    pub production_wages: Decimal,
    pub loading_wages: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpensesSummary {
    pub transport: Decimal,
    pub utilities: Decimal,
    pub salaries: Decimal,
    pub repairs: Decimal,
    pub miscellaneous: Decimal,
    pub total: Decimal,
}

/// Profit and loss for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitLossReport {
    pub period: DateRange,
    pub production: ProductionSummary,
    pub sales: SalesSummary,
    pub materials: MaterialsSummary,
    pub payments: PaymentsSummary,
    pub cogs: CostOfGoods,
    pub expenses: ExpensesSummary,
    pub rates: PieceRates,
    pub net_profit: Decimal,
}

/// Insertion-ordered accumulator keyed by display name
struct Grouped<T> {
    index: HashMap<String, usize>,
    items: Vec<T>,
}

impl<T> Grouped<T> {
    fn new() -> Self {
        Self { index: HashMap::new(), items: Vec::new() }
    }

    fn entry(&mut self, name: &str, init: impl FnOnce(String) -> T) -> &mut T {
        let items = &mut self.items;
        let slot = *self.index.entry(name.to_string()).or_insert_with(|| {
            items.push(init(name.to_string()));
            items.len() - 1
        });
        &mut self.items[slot]
    }
}

fn display_name(name: Option<&str>) -> &str {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => UNKNOWN,
    }
}

fn summarize_production(logs: &[ProductionLog]) -> ProductionSummary {
    let mut by_product = Grouped::new();
    let mut total_punches = 0i64;
    let mut total_quantity = 0i64;

    for log in logs {
        let punches = i64::from(log.punches.unwrap_or(0));
        let quantity = i64::from(log.quantity);
        let total = by_product.entry(display_name(Some(log.product_name.as_str())), |name| ProductTotal {
            name,
            quantity: 0,
            punches: 0,
        });
        total.quantity += quantity;
        total.punches += punches;
        total_punches += punches;
        total_quantity += quantity;
    }

    ProductionSummary { total_punches, total_quantity, by_product: by_product.items }
}

fn summarize_sales(sales: &[Sale]) -> Result<SalesSummary, LedgerError> {
    Ok(SalesSummary {
        total_revenue: checked_sum(sales.iter().map(|s| s.total_amount))?,
        total_quantity_sold: sales.iter().map(|s| i64::from(s.quantity_sold)).sum(),
        outstanding_balance: checked_sum(sales.iter().map(|s| s.balance_due))?,
        sale_count: sales.len(),
    })
}

fn summarize_materials(
    purchases: &[MaterialPurchase],
    usages: &[MaterialUsage],
    names: &HashMap<Uuid, String>,
) -> Result<MaterialsSummary, LedgerError> {
    let name_of = |id: &Uuid| display_name(names.get(id).map(String::as_str)).to_string();
    let blank = |name| MaterialTotal { name, quantity: Decimal::ZERO, cost: Decimal::ZERO };

    let mut purchased = Grouped::new();
    let mut total_purchase_cost = Decimal::ZERO;
    for purchase in purchases {
        let cost = purchase.total_cost()?;
        let total = purchased.entry(&name_of(&purchase.material_id), blank);
        total.quantity = checked_add(total.quantity, purchase.quantity_purchased)?;
        total.cost = checked_add(total.cost, cost)?;
        total_purchase_cost = checked_add(total_purchase_cost, cost)?;
    }

    let mut used = Grouped::new();
    for usage in usages {
        let total = used.entry(&name_of(&usage.material_id), blank);
        total.quantity = checked_add(total.quantity, usage.quantity_used)?;
    }

    Ok(MaterialsSummary { purchased: purchased.items, used: used.items, total_purchase_cost })
}

fn summarize_payments(payments: &[EmployeePayment]) -> Result<PaymentsSummary, LedgerError> {
    let mut summary = PaymentsSummary::default();
    for payment in payments {
        let bucket = match PaymentType::classify(&payment.payment_type) {
            PaymentType::Salary => &mut summary.salary,
            PaymentType::Advance => &mut summary.advance,
            PaymentType::Bonus => &mut summary.bonus,
            PaymentType::Incentive => &mut summary.incentive,
        };
        *bucket = checked_add(*bucket, payment.amount)?;
    }
    summary.total =
        checked_sum([summary.salary, summary.advance, summary.bonus, summary.incentive])?;
    Ok(summary)
}

fn summarize_expenses(expenses: &[OtherExpense]) -> Result<ExpensesSummary, LedgerError> {
    let mut summary = ExpensesSummary::default();
    for expense in expenses {
        let bucket = match ExpenseCategory::classify(&expense.expense_type) {
            ExpenseCategory::Transport => &mut summary.transport,
            ExpenseCategory::Utilities => &mut summary.utilities,
            ExpenseCategory::Salaries => &mut summary.salaries,
            ExpenseCategory::Repairs => &mut summary.repairs,
            ExpenseCategory::Miscellaneous => &mut summary.miscellaneous,
        };
        *bucket = checked_add(*bucket, expense.amount)?;
    }
    summary.total = checked_sum([
        summary.transport,
        summary.utilities,
        summary.salaries,
        summary.repairs,
        summary.miscellaneous,
    ])?;
    Ok(summary)
}

/// Aggregate a period's rows into a profit and loss report
///
/// Fails with [`LedgerError::Overflow`] when a total does not fit in a
/// `Decimal`.
pub fn build_report(input: &ReportInput<'_>) -> Result<ProfitLossReport, LedgerError> {
    let production = summarize_production(input.production);
    let sales = summarize_sales(input.sales)?;
    let materials = summarize_materials(input.purchases, input.usages, input.material_names)?;
    let payments = summarize_payments(input.payments)?;
    let expenses = summarize_expenses(input.expenses)?;

    let production_wages =
        checked_mul(Decimal::from(production.total_punches), input.rates.production_per_punch)?;
    let loading_wages =
        checked_mul(Decimal::from(sales.total_quantity_sold), input.rates.loading_per_brick)?;
    let cogs = CostOfGoods {
        material_cost: materials.total_purchase_cost,
        production_wages,
        loading_wages,
        total: checked_sum([materials.total_purchase_cost, production_wages, loading_wages])?,
    };

    let net_profit = checked_sub(
        checked_sub(checked_sub(sales.total_revenue, cogs.total)?, payments.total)?,
        expenses.total,
    )?;

    Ok(ProfitLossReport {
        period: input.period,
        production,
        sales,
        materials,
        payments,
        cogs,
        expenses,
        rates: input.rates,
        net_profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn expense(expense_type: &str, amount: i64) -> OtherExpense {
        OtherExpense {
            id: Uuid::new_v4(),
            factory_id: Uuid::nil(),
            date: date(3),
            expense_type: expense_type.to_string(),
            description: "test".to_string(),
            amount: Decimal::from(amount),
            vendor_name: None,
            receipt_number: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payment(payment_type: &str, amount: i64) -> EmployeePayment {
        EmployeePayment {
            id: Uuid::new_v4(),
            factory_id: Uuid::nil(),
            date: date(4),
            employee_name: "Raju".to_string(),
            amount: Decimal::from(amount),
            payment_type: payment_type.to_string(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn log(product: &str, quantity: i32, punches: Option<i32>) -> ProductionLog {
        ProductionLog {
            id: Uuid::new_v4(),
            factory_id: Uuid::nil(),
            date: date(1),
            product_id: Uuid::nil(),
            product_name: product.to_string(),
            quantity,
            punches,
            remarks: None,
            created_at: Utc::now(),
        }
    }

    fn empty_input<'a>(names: &'a HashMap<Uuid, String>) -> ReportInput<'a> {
        ReportInput {
            period: DateRange::new(date(1), date(30)),
            production: &[],
            sales: &[],
            purchases: &[],
            usages: &[],
            payments: &[],
            expenses: &[],
            material_names: names,
            rates: PieceRates::default(),
        }
    }

    #[test]
    fn test_unrecognized_expense_goes_to_miscellaneous() {
        let names = HashMap::new();
        let expenses = vec![expense("tea", 120), expense("Transport", 500), expense("Office Salaries", 900)];
        let report = build_report(&ReportInput { expenses: &expenses, ..empty_input(&names) }).unwrap();

        assert_eq!(report.expenses.miscellaneous, Decimal::from(120));
        assert_eq!(report.expenses.transport, Decimal::from(500));
        assert_eq!(report.expenses.salaries, Decimal::from(900));
        assert_eq!(report.expenses.total, Decimal::from(1520));
    }

    #[test]
    fn test_unrecognized_payment_counts_as_salary() {
        let names = HashMap::new();
        let payments = vec![payment("overtime", 300), payment("Advance", 200)];
        let report = build_report(&ReportInput { payments: &payments, ..empty_input(&names) }).unwrap();

        assert_eq!(report.payments.salary, Decimal::from(300));
        assert_eq!(report.payments.advance, Decimal::from(200));
        assert_eq!(report.payments.total, Decimal::from(500));
    }

    #[test]
    fn test_production_grouped_by_product() {
        let names = HashMap::new();
        let logs = vec![log("Red brick", 1000, Some(100)), log("", 50, None), log("Red brick", 500, Some(40))];
        let report = build_report(&ReportInput { production: &logs, ..empty_input(&names) }).unwrap();

        assert_eq!(report.production.total_punches, 140);
        assert_eq!(report.production.by_product.len(), 2);
        assert_eq!(report.production.by_product[0].name, "Red brick");
        assert_eq!(report.production.by_product[0].quantity, 1500);
        assert_eq!(report.production.by_product[1].name, "Unknown");
        assert_eq!(report.cogs.production_wages, Decimal::from(140 * 15));
    }

    #[test]
    fn test_empty_period_is_all_zero() {
        let names = HashMap::new();
        let report = build_report(&empty_input(&names)).unwrap();
        assert_eq!(report.net_profit, Decimal::ZERO);
        assert_eq!(report.cogs.total, Decimal::ZERO);
        assert!(report.production.by_product.is_empty());
    }

    #[test]
    fn test_expense_total_overflow_is_an_error() {
        let names = HashMap::new();
        let mut expenses = vec![expense("Transport", 0), expense("Transport", 0)];
        expenses[0].amount = Decimal::MAX;
        expenses[1].amount = Decimal::MAX;
        let result = build_report(&ReportInput { expenses: &expenses, ..empty_input(&names) });
        assert_eq!(result.unwrap_err(), LedgerError::Overflow);
    }
}
