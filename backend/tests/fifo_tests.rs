//! Customer payment allocation tests
//!
//! Tests for FIFO allocation of payments against open invoices:
//! - Oldest invoice is settled first, same-day ties are stable
//! - applied + unapplied always equals the payment
//! - No balance goes negative and no invoice absorbs more than it owes
//! - Overpayment is reported back as the unapplied remainder
//! - Sale amounts received beyond the total spill over

use brickworks_backend::services::sale::ReceivedSplit;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::ledger::{allocate_payment, customer_key, customer_summaries, LedgerError, OpenInvoice};
use shared::models::Sale;
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn invoice(day: u32, balance: &str) -> OpenInvoice {
    OpenInvoice {
        id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        created_at: Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap(),
        amount_received: Decimal::ZERO,
        balance_due: dec(balance),
    }
}

fn sale_row(customer: &str, day: u32, total: &str) -> Sale {
    Sale {
        id: Uuid::new_v4(),
        factory_id: Uuid::nil(),
        date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        customer_name: customer.to_string(),
        customer_phone: None,
        product_id: Uuid::nil(),
        quantity_sold: 1000,
        rate_per_unit: dec(total) / dec("1000"),
        total_amount: dec(total),
        amount_received: Decimal::ZERO,
        balance_due: dec(total),
        notes: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).unwrap(),
    }
}

/// Open invoices of one customer, matched the way the payment query matches
/// `LOWER(TRIM(customer_name))`
fn open_invoices_of(sales: &[Sale], customer: &str) -> Vec<OpenInvoice> {
    let key = customer_key(customer);
    sales
        .iter()
        .filter(|s| customer_key(&s.customer_name) == key && s.balance_due > Decimal::ZERO)
        .map(OpenInvoice::from)
        .collect()
}

fn balances_after(invoices: &[OpenInvoice], amount: Decimal, exclude: Option<Uuid>) -> Vec<Decimal> {
    let allocation = allocate_payment(invoices, amount, exclude).unwrap();
    invoices
        .iter()
        .map(|inv| {
            allocation
                .adjustments
                .iter()
                .find(|a| a.sale_id == inv.id)
                .map(|a| a.new_balance_due)
                .unwrap_or(inv.balance_due)
        })
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 250 over balances [100, 200, 50] leaves [0, 50, 50]
    #[test]
    fn test_oldest_invoices_settle_first() {
        let invoices = vec![invoice(1, "100"), invoice(2, "200"), invoice(3, "50")];
        let allocation = allocate_payment(&invoices, dec("250"), None).unwrap();

        assert_eq!(balances_after(&invoices, dec("250"), None), vec![dec("0"), dec("50"), dec("50")]);
        assert_eq!(allocation.unapplied, Decimal::ZERO);
        assert_eq!(allocation.adjustments.len(), 2);
    }

    /// Input order does not matter; dates do
    #[test]
    fn test_unsorted_input() {
        let invoices = vec![invoice(3, "50"), invoice(1, "100"), invoice(2, "200")];
        let allocation = allocate_payment(&invoices, dec("120"), None).unwrap();

        assert_eq!(allocation.adjustments[0].sale_id, invoices[1].id);
        assert_eq!(allocation.adjustments[1].sale_id, invoices[2].id);
        assert_eq!(allocation.adjustments[1].amount_applied, dec("20"));
    }

    /// 1000 against 350 owed settles everything and returns 650
    #[test]
    fn test_overpayment_remainder() {
        let invoices = vec![invoice(1, "100"), invoice(2, "200"), invoice(3, "50")];
        let allocation = allocate_payment(&invoices, dec("1000"), None).unwrap();

        assert!(allocation.adjustments.iter().all(|a| a.new_balance_due.is_zero()));
        assert_eq!(allocation.applied, dec("350"));
        assert_eq!(allocation.unapplied, dec("650"));
        assert!(!allocation.is_fully_applied());
    }

    /// The excluded invoice is skipped even when it is the oldest
    #[test]
    fn test_excluded_invoice_untouched() {
        let invoices = vec![invoice(1, "100"), invoice(2, "200")];
        let excluded = invoices[0].id;

        let balances = balances_after(&invoices, dec("150"), Some(excluded));
        assert_eq!(balances, vec![dec("100"), dec("50")]);
    }

    /// Same-day invoices go by creation time
    #[test]
    fn test_same_day_tie_break() {
        let mut early = invoice(4, "80");
        let mut late = invoice(4, "80");
        early.created_at = Utc.with_ymd_and_hms(2024, 5, 4, 8, 0, 0).unwrap();
        late.created_at = early.created_at + Duration::minutes(5);

        let allocation = allocate_payment(&[late.clone(), early.clone()], dec("80"), None).unwrap();
        assert_eq!(allocation.adjustments.len(), 1);
        assert_eq!(allocation.adjustments[0].sale_id, early.id);
    }

    /// Settled invoices are never touched
    #[test]
    fn test_paid_invoices_skipped() {
        let mut paid = invoice(1, "0");
        paid.amount_received = dec("500");
        let invoices = vec![paid, invoice(2, "40")];

        let allocation = allocate_payment(&invoices, dec("40"), None).unwrap();
        assert_eq!(allocation.adjustments.len(), 1);
        assert_eq!(allocation.adjustments[0].new_amount_received, dec("40"));
    }

    #[test]
    fn test_non_positive_payment_rejected() {
        let invoices = vec![invoice(1, "100")];
        assert_eq!(
            allocate_payment(&invoices, Decimal::ZERO, None),
            Err(LedgerError::NonPositivePayment(Decimal::ZERO))
        );
        assert!(allocate_payment(&invoices, dec("-10"), None).is_err());
    }

    #[test]
    fn test_received_split_on_new_sale() {
        let exact = ReceivedSplit::of(dec("5000"), dec("2000"));
        assert_eq!(exact.amount_received, dec("2000"));
        assert_eq!(exact.balance_due, dec("3000"));
        assert_eq!(exact.excess, Decimal::ZERO);

        let over = ReceivedSplit::of(dec("5000"), dec("6500"));
        assert_eq!(over.amount_received, dec("5000"));
        assert_eq!(over.balance_due, Decimal::ZERO);
        assert_eq!(over.excess, dec("1500"));
    }

    /// "Ramesh", " ramesh " and "RAMESH" are one customer with one queue
    #[test]
    fn test_name_variants_share_a_queue() {
        let sales = vec![
            sale_row(" ramesh ", 2, "300"),
            sale_row("Suresh", 1, "900"),
            sale_row("Ramesh", 1, "200"),
            sale_row("RAMESH", 3, "400"),
        ];

        let invoices = open_invoices_of(&sales, "Ramesh ");
        assert_eq!(invoices.len(), 3);

        let allocation = allocate_payment(&invoices, dec("450"), None).unwrap();
        let settled: Vec<Uuid> = allocation.adjustments.iter().map(|a| a.sale_id).collect();
        assert_eq!(settled, vec![sales[2].id, sales[0].id]);
        assert_eq!(allocation.adjustments[1].new_balance_due, dec("50"));
        assert_eq!(allocation.unapplied, Decimal::ZERO);

        let summaries = customer_summaries(&sales);
        assert_eq!(summaries.len(), 2);
        let ramesh = summaries
            .iter()
            .find(|s| customer_key(&s.customer_name) == "ramesh")
            .unwrap();
        assert_eq!(ramesh.transaction_count, 3);
        assert_eq!(ramesh.balance_due, dec("900"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000_000i64).prop_map(|n| Decimal::new(n, 2)) // 0.01 to 100000.00
    }

    fn balance_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=5_000_000i64).prop_map(|n| Decimal::new(n, 2))
    }

    fn invoices_strategy() -> impl Strategy<Value = Vec<OpenInvoice>> {
        prop::collection::vec((1u32..=28u32, balance_strategy()), 0..12).prop_map(|rows| {
            rows.into_iter()
                .map(|(day, balance)| OpenInvoice {
                    id: Uuid::new_v4(),
                    date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
                    created_at: Utc::now(),
                    amount_received: Decimal::ZERO,
                    balance_due: balance,
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every rupee of the payment is either applied or handed back
        #[test]
        fn prop_payment_conserved(invoices in invoices_strategy(), amount in amount_strategy()) {
            let allocation = allocate_payment(&invoices, amount, None).unwrap();
            let applied: Decimal = allocation.adjustments.iter().map(|a| a.amount_applied).sum();

            prop_assert_eq!(applied, allocation.applied);
            prop_assert_eq!(allocation.applied + allocation.unapplied, amount);
            prop_assert!(allocation.unapplied >= Decimal::ZERO);
        }

        /// No invoice goes negative or receives more than it owed
        #[test]
        fn prop_no_negative_balances(invoices in invoices_strategy(), amount in amount_strategy()) {
            let allocation = allocate_payment(&invoices, amount, None).unwrap();

            for adj in &allocation.adjustments {
                let inv = invoices.iter().find(|i| i.id == adj.sale_id).unwrap();
                prop_assert!(adj.new_balance_due >= Decimal::ZERO);
                prop_assert!(adj.amount_applied <= inv.balance_due);
                prop_assert_eq!(adj.new_balance_due + adj.amount_applied, inv.balance_due);
                prop_assert_eq!(adj.new_amount_received, inv.amount_received + adj.amount_applied);
            }
        }

        /// A remainder is left only when everything owed has been settled
        #[test]
        fn prop_remainder_only_when_all_settled(invoices in invoices_strategy(), amount in amount_strategy()) {
            let owed: Decimal = invoices.iter().map(|i| i.balance_due).sum();
            let allocation = allocate_payment(&invoices, amount, None).unwrap();

            if amount >= owed {
                prop_assert_eq!(allocation.applied, owed);
                prop_assert_eq!(allocation.unapplied, amount - owed);
            } else {
                prop_assert_eq!(allocation.applied, amount);
                prop_assert!(allocation.is_fully_applied());
            }
        }

        /// Only the last touched invoice can be left partially paid
        #[test]
        fn prop_only_last_invoice_partial(invoices in invoices_strategy(), amount in amount_strategy()) {
            let allocation = allocate_payment(&invoices, amount, None).unwrap();
            let n = allocation.adjustments.len();

            for adj in allocation.adjustments.iter().take(n.saturating_sub(1)) {
                prop_assert!(adj.new_balance_due.is_zero());
            }
        }
    }
}
