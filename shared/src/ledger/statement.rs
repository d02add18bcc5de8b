//! Customer summaries and running-balance statements, derived from sales

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CustomerSummary, PaymentStatus, Sale};

/// Key used to group a customer's sales
pub fn customer_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Aggregate sales per customer, largest total first.
///
/// Names are grouped case-insensitively; the first spelling seen is kept for
/// display along with the first phone number recorded.
pub fn customer_summaries(sales: &[Sale]) -> Vec<CustomerSummary> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut summaries: Vec<CustomerSummary> = Vec::new();

    for sale in sales {
        let slot = *index.entry(customer_key(&sale.customer_name)).or_insert_with(|| {
            summaries.push(CustomerSummary {
                customer_name: sale.customer_name.trim().to_string(),
                customer_phone: None,
                total_sales: Decimal::ZERO,
                total_received: Decimal::ZERO,
                balance_due: Decimal::ZERO,
                transaction_count: 0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[slot];
        if summary.customer_phone.is_none() {
            summary.customer_phone = sale.customer_phone.clone();
        }
        summary.total_sales += sale.total_amount;
        summary.total_received += sale.amount_received;
        summary.balance_due += sale.balance_due;
        summary.transaction_count += 1;
    }

    summaries.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    summaries
}

/// Filters applied to the customer list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerFilter {
    /// Only customers that still owe money
    #[serde(default)]
    pub dues_only: bool,
    /// Case-insensitive match on name or phone
    pub search: Option<String>,
}

impl CustomerFilter {
    pub fn matches(&self, summary: &CustomerSummary) -> bool {
        if self.dues_only && summary.balance_due <= Decimal::ZERO {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                summary.customer_name.to_lowercase().contains(&term)
                    || summary
                        .customer_phone
                        .as_deref()
                        .is_some_and(|phone| phone.contains(&term))
            }
            _ => true,
        }
    }

    pub fn apply(&self, summaries: Vec<CustomerSummary>) -> Vec<CustomerSummary> {
        summaries.into_iter().filter(|s| self.matches(s)).collect()
    }
}

/// One line of a customer statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub sale_id: Uuid,
    pub invoice_number: String,
    pub date: NaiveDate,
    pub quantity_sold: i32,
    pub total_amount: Decimal,
    pub amount_received: Decimal,
    pub status: PaymentStatus,
    /// Balance after this sale was added, before its payment
    pub balance_after_sale: Decimal,
    /// Balance carried to the next line
    pub running_balance: Decimal,
}

/// A customer's statement with its closing balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStatement {
    pub customer_name: String,
    pub lines: Vec<StatementLine>,
    pub total_sales: Decimal,
    pub total_received: Decimal,
    pub closing_balance: Decimal,
}

/// Build the running-balance statement for one customer's sales.
///
/// Lines run oldest first; each sale adds its total and then subtracts what
/// was received on it. Display only, nothing here is written back.
pub fn customer_statement(customer_name: &str, sales: &[Sale]) -> CustomerStatement {
    let key = customer_key(customer_name);
    let mut ordered: Vec<&Sale> = sales
        .iter()
        .filter(|s| customer_key(&s.customer_name) == key)
        .collect();
    ordered.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut running = Decimal::ZERO;
    let mut total_sales = Decimal::ZERO;
    let mut total_received = Decimal::ZERO;
    let lines = ordered
        .into_iter()
        .map(|sale| {
            running += sale.total_amount;
            let balance_after_sale = running;
            running -= sale.amount_received;
            total_sales += sale.total_amount;
            total_received += sale.amount_received;

            StatementLine {
                sale_id: sale.id,
                invoice_number: sale.invoice_number(),
                date: sale.date,
                quantity_sold: sale.quantity_sold,
                total_amount: sale.total_amount,
                amount_received: sale.amount_received,
                status: sale.payment_status(),
                balance_after_sale,
                running_balance: running,
            }
        })
        .collect();

    CustomerStatement {
        customer_name: customer_name.trim().to_string(),
        lines,
        total_sales,
        total_received,
        closing_balance: running,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sale(name: &str, day: u32, total: i64, received: i64) -> Sale {
        Sale {
            id: Uuid::new_v4(),
            factory_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            customer_name: name.to_string(),
            customer_phone: Some("9876543210".to_string()),
            product_id: Uuid::nil(),
            quantity_sold: 100,
            rate_per_unit: Decimal::ONE,
            total_amount: Decimal::from(total),
            amount_received: Decimal::from(received),
            balance_due: Decimal::from(total - received),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summaries_group_case_insensitively() {
        let sales = vec![
            sale("Suresh", 1, 500, 500),
            sale("suresh ", 3, 300, 100),
            sale("Anil", 2, 1000, 0),
        ];
        let summaries = customer_summaries(&sales);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].customer_name, "Anil");
        assert_eq!(summaries[1].customer_name, "Suresh");
        assert_eq!(summaries[1].total_sales, Decimal::from(800));
        assert_eq!(summaries[1].balance_due, Decimal::from(200));
        assert_eq!(summaries[1].transaction_count, 2);
    }

    #[test]
    fn test_filter_dues_only_and_search() {
        let summaries = customer_summaries(&[
            sale("Suresh", 1, 500, 500),
            sale("Anil", 2, 1000, 0),
        ]);

        let dues = CustomerFilter { dues_only: true, search: None }.apply(summaries.clone());
        assert_eq!(dues.len(), 1);
        assert_eq!(dues[0].customer_name, "Anil");

        let found = CustomerFilter { dues_only: false, search: Some("SUR".to_string()) }
            .apply(summaries.clone());
        assert_eq!(found.len(), 1);

        let by_phone = CustomerFilter { dues_only: false, search: Some("98765".to_string()) }
            .apply(summaries);
        assert_eq!(by_phone.len(), 2);
    }

    #[test]
    fn test_statement_running_balance() {
        let sales = vec![
            sale("Anil", 5, 300, 0),
            sale("Anil", 1, 1000, 600),
            sale("Other", 2, 50, 0),
        ];
        let statement = customer_statement("anil", &sales);

        assert_eq!(statement.lines.len(), 2);
        assert_eq!(statement.lines[0].balance_after_sale, Decimal::from(1000));
        assert_eq!(statement.lines[0].running_balance, Decimal::from(400));
        assert_eq!(statement.lines[1].balance_after_sale, Decimal::from(700));
        assert_eq!(statement.lines[1].running_balance, Decimal::from(700));
        assert_eq!(statement.closing_balance, Decimal::from(700));
        assert_eq!(statement.lines[1].status, PaymentStatus::Unpaid);
    }

    #[test]
    fn test_statement_for_unknown_customer_is_empty() {
        let statement = customer_statement("Nobody", &[sale("Anil", 1, 10, 0)]);
        assert!(statement.lines.is_empty());
        assert_eq!(statement.closing_balance, Decimal::ZERO);
    }
}
