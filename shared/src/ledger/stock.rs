//! Stock reconciliation for raw materials

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{checked_add, checked_mul, checked_sub, checked_sum, LedgerError};
use crate::models::{MaterialPurchase, MaterialUsage};

/// Stock position derived from a material's full purchase/usage history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPosition {
    /// Purchased minus used; negative when more was consumed than bought
    pub quantity: Decimal,
    /// Weighted average unit cost over all purchases, zero with no purchases
    pub average_cost: Decimal,
    pub total_purchased: Decimal,
    pub total_used: Decimal,
    /// Sum of `quantity_purchased * unit_cost`
    pub total_value: Decimal,
}

impl StockPosition {
    /// Recompute from raw movements: `(quantity, unit_cost)` per purchase and
    /// quantity per usage.
    pub fn from_movements<P, U>(purchases: P, usages: U) -> Result<Self, LedgerError>
    where
        P: IntoIterator<Item = (Decimal, Decimal)>,
        U: IntoIterator<Item = Decimal>,
    {
        let (total_purchased, total_value) = purchases.into_iter().try_fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(qty, value), (quantity, unit_cost)| {
                let cost = checked_mul(quantity, unit_cost)?;
                Ok::<_, LedgerError>((checked_add(qty, quantity)?, checked_add(value, cost)?))
            },
        )?;
        let total_used = checked_sum(usages)?;

        let average_cost = if total_purchased > Decimal::ZERO {
            total_value
                .checked_div(total_purchased)
                .ok_or(LedgerError::Overflow)?
        } else {
            Decimal::ZERO
        };

        Ok(Self {
            quantity: checked_sub(total_purchased, total_used)?,
            average_cost,
            total_purchased,
            total_used,
            total_value,
        })
    }

    /// Value of the stock on hand at the average cost
    pub fn stock_value(&self) -> Result<Decimal, LedgerError> {
        checked_mul(self.quantity, self.average_cost)
    }
}

/// Recompute a material's stock from every purchase and usage recorded for it.
///
/// The slices must hold the complete history of one material; a partial read
/// produces wrong figures.
pub fn recompute_stock(
    purchases: &[MaterialPurchase],
    usages: &[MaterialUsage],
) -> Result<StockPosition, LedgerError> {
    StockPosition::from_movements(
        purchases.iter().map(|p| (p.quantity_purchased, p.unit_cost)),
        usages.iter().map(|u| u.quantity_used),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn purchase(qty: i64, cost: i64) -> MaterialPurchase {
        MaterialPurchase {
            id: Uuid::new_v4(),
            factory_id: Uuid::nil(),
            material_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            quantity_purchased: Decimal::from(qty),
            unit_cost: Decimal::from(cost),
            supplier_name: "Balaji Traders".to_string(),
            supplier_phone: None,
            payment_made: Decimal::ZERO,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn usage(qty: i64) -> MaterialUsage {
        MaterialUsage {
            id: Uuid::new_v4(),
            factory_id: Uuid::nil(),
            material_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            quantity_used: Decimal::from(qty),
            purpose: "production".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_is_purchased_minus_used() {
        let position =
            recompute_stock(&[purchase(100, 10), purchase(50, 10)], &[usage(30)]).unwrap();
        assert_eq!(position.quantity, Decimal::from(120));
        assert_eq!(position.total_purchased, Decimal::from(150));
        assert_eq!(position.total_used, Decimal::from(30));
    }

    #[test]
    fn test_weighted_average_cost() {
        let position = recompute_stock(&[purchase(100, 10), purchase(50, 16)], &[]).unwrap();
        assert_eq!(position.average_cost, Decimal::from(12));
        assert_eq!(position.total_value, Decimal::from(1800));
    }

    #[test]
    fn test_no_purchases_means_zero_cost() {
        let position = recompute_stock(&[], &[usage(5)]).unwrap();
        assert_eq!(position.average_cost, Decimal::ZERO);
        assert_eq!(position.quantity, Decimal::from(-5));
    }

    #[test]
    fn test_empty_history() {
        let position = recompute_stock(&[], &[]).unwrap();
        assert_eq!(position.quantity, Decimal::ZERO);
        assert_eq!(position.average_cost, Decimal::ZERO);
        assert_eq!(position.stock_value(), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_usage_does_not_move_average_cost() {
        let before = recompute_stock(&[purchase(100, 10), purchase(50, 16)], &[]).unwrap();
        let after =
            recompute_stock(&[purchase(100, 10), purchase(50, 16)], &[usage(140)]).unwrap();
        assert_eq!(before.average_cost, after.average_cost);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let purchases = vec![purchase(70, 9), purchase(30, 13)];
        let usages = vec![usage(12), usage(8)];
        assert_eq!(recompute_stock(&purchases, &usages), recompute_stock(&purchases, &usages));
    }

    #[test]
    fn test_oversized_purchase_is_an_error() {
        let huge = Decimal::from(100_000_000_000_000_000i64);
        let result = StockPosition::from_movements(vec![(huge, huge)], Vec::new());
        assert_eq!(result, Err(LedgerError::Overflow));
    }
}
