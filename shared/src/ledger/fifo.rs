//! FIFO allocation of customer payments against open invoices

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LedgerError;
use crate::models::Sale;

/// The slice of a sale that payment allocation needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenInvoice {
    pub id: Uuid,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub amount_received: Decimal,
    pub balance_due: Decimal,
}

impl From<&Sale> for OpenInvoice {
    fn from(sale: &Sale) -> Self {
        Self {
            id: sale.id,
            date: sale.date,
            created_at: sale.created_at,
            amount_received: sale.amount_received,
            balance_due: sale.balance_due,
        }
    }
}

/// New receivable figures for one invoice touched by a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceAdjustment {
    pub sale_id: Uuid,
    pub amount_applied: Decimal,
    pub new_amount_received: Decimal,
    pub new_balance_due: Decimal,
}

/// Outcome of spreading one payment over a customer's invoices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// In application order, oldest invoice first
    pub adjustments: Vec<InvoiceAdjustment>,
    pub applied: Decimal,
    /// Overpayment left after every open invoice is settled
    pub unapplied: Decimal,
}

impl Allocation {
    pub fn is_fully_applied(&self) -> bool {
        self.unapplied.is_zero()
    }
}

/// Apply `amount` to `invoices` oldest first.
///
/// Invoices are ordered by sale date, then creation time, then id, so the
/// order is total even for same-day sales. Invoices without a positive balance
/// and the invoice named by `exclude` are skipped. Each invoice absorbs at most
/// its balance; allocation stops once the payment is used up.
pub fn allocate_payment(
    invoices: &[OpenInvoice],
    amount: Decimal,
    exclude: Option<Uuid>,
) -> Result<Allocation, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositivePayment(amount));
    }

    let mut open: Vec<&OpenInvoice> = invoices
        .iter()
        .filter(|inv| inv.balance_due > Decimal::ZERO && Some(inv.id) != exclude)
        .collect();
    open.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });

    let mut remaining = amount;
    let mut adjustments = Vec::new();

    for invoice in open {
        if remaining <= Decimal::ZERO {
            break;
        }
        let apply = remaining.min(invoice.balance_due);
        adjustments.push(InvoiceAdjustment {
            sale_id: invoice.id,
            amount_applied: apply,
            new_amount_received: invoice.amount_received + apply,
            new_balance_due: invoice.balance_due - apply,
        });
        remaining -= apply;
    }

    Ok(Allocation {
        adjustments,
        applied: amount - remaining,
        unapplied: remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invoice(day: u32, balance: i64) -> OpenInvoice {
        OpenInvoice {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            created_at: Utc::now(),
            amount_received: Decimal::ZERO,
            balance_due: Decimal::from(balance),
        }
    }

    #[test]
    fn test_oldest_invoice_paid_first() {
        let invoices = vec![invoice(1, 100), invoice(2, 200), invoice(3, 50)];
        let allocation = allocate_payment(&invoices, Decimal::from(250), None).unwrap();

        let balances: Vec<Decimal> = allocation.adjustments.iter().map(|a| a.new_balance_due).collect();
        assert_eq!(balances, vec![Decimal::ZERO, Decimal::from(50)]);
        assert_eq!(allocation.applied, Decimal::from(250));
        assert!(allocation.is_fully_applied());
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let a = invoice(1, 100);
        let b = invoice(2, 200);
        let c = invoice(3, 50);
        let shuffled = vec![c.clone(), a.clone(), b.clone()];
        let allocation = allocate_payment(&shuffled, Decimal::from(250), None).unwrap();

        assert_eq!(allocation.adjustments[0].sale_id, a.id);
        assert_eq!(allocation.adjustments[1].sale_id, b.id);
        assert_eq!(allocation.adjustments.len(), 2);
    }

    #[test]
    fn test_overpayment_is_reported() {
        let invoices = vec![invoice(1, 100), invoice(2, 200), invoice(3, 50)];
        let allocation = allocate_payment(&invoices, Decimal::from(1000), None).unwrap();

        assert!(allocation.adjustments.iter().all(|a| a.new_balance_due.is_zero()));
        assert_eq!(allocation.applied, Decimal::from(350));
        assert_eq!(allocation.unapplied, Decimal::from(650));
    }

    #[test]
    fn test_excluded_invoice_is_skipped() {
        let invoices = vec![invoice(1, 100), invoice(2, 200)];
        let allocation =
            allocate_payment(&invoices, Decimal::from(150), Some(invoices[0].id)).unwrap();

        assert_eq!(allocation.adjustments.len(), 1);
        assert_eq!(allocation.adjustments[0].sale_id, invoices[1].id);
        assert_eq!(allocation.adjustments[0].new_balance_due, Decimal::from(50));
    }

    #[test]
    fn test_settled_invoices_are_skipped() {
        let invoices = vec![invoice(1, 0), invoice(2, 80)];
        let allocation = allocate_payment(&invoices, Decimal::from(30), None).unwrap();

        assert_eq!(allocation.adjustments.len(), 1);
        assert_eq!(allocation.adjustments[0].sale_id, invoices[1].id);
    }

    #[test]
    fn test_same_day_ordered_by_creation() {
        let mut earlier = invoice(5, 40);
        let mut later = invoice(5, 40);
        earlier.created_at = Utc::now() - Duration::hours(2);
        later.created_at = Utc::now();

        let allocation =
            allocate_payment(&[later.clone(), earlier.clone()], Decimal::from(40), None).unwrap();
        assert_eq!(allocation.adjustments.len(), 1);
        assert_eq!(allocation.adjustments[0].sale_id, earlier.id);
    }

    #[test]
    fn test_received_accumulates() {
        let mut partly_paid = invoice(1, 60);
        partly_paid.amount_received = Decimal::from(40);
        let allocation = allocate_payment(&[partly_paid], Decimal::from(25), None).unwrap();

        assert_eq!(allocation.adjustments[0].new_amount_received, Decimal::from(65));
        assert_eq!(allocation.adjustments[0].new_balance_due, Decimal::from(35));
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let invoices = vec![invoice(1, 100)];
        assert_eq!(
            allocate_payment(&invoices, Decimal::ZERO, None),
            Err(LedgerError::NonPositivePayment(Decimal::ZERO))
        );
        assert!(allocate_payment(&invoices, Decimal::from(-5), None).is_err());
    }

    #[test]
    fn test_no_open_invoices_leaves_everything_unapplied() {
        let allocation = allocate_payment(&[], Decimal::from(75), None).unwrap();
        assert!(allocation.adjustments.is_empty());
        assert_eq!(allocation.unapplied, Decimal::from(75));
    }
}
