//! Validation utilities for BrickWorks Manager
//!
//! Checks run by the backend before anything is written. Each returns a short
//! message suitable for showing next to the offending field.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::Plan;

// ============================================================================
// Ledger Validations
// ============================================================================

/// Largest quantity, rate or amount accepted on a single entry (one lakh
/// crore). Products and period totals of such values stay well inside
/// `Decimal`'s range.
pub const MAX_LEDGER_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Quantities and payments must be strictly positive
pub fn validate_positive_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount <= Decimal::ZERO {
        return Err("Amount must be greater than zero");
    }
    validate_upper_bound(amount)
}

/// Costs, rates and amounts received may be zero but never negative
pub fn validate_non_negative(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    validate_upper_bound(amount)
}

fn validate_upper_bound(amount: Decimal) -> Result<(), &'static str> {
    if amount > MAX_LEDGER_AMOUNT {
        return Err("Amount is too large");
    }
    Ok(())
}

/// Sold and produced quantities are whole units
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be at least 1");
    }
    Ok(())
}

/// Validate the money taken at the time of a sale
///
/// Receiving more than the sale total is allowed; the excess is applied to the
/// customer's older invoices.
pub fn validate_amount_received(amount_received: Decimal) -> Result<(), &'static str> {
    if amount_received < Decimal::ZERO {
        return Err("Amount received cannot be negative");
    }
    validate_upper_bound(amount_received)
}

/// Validate a reporting period
pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), &'static str> {
    if end < start {
        return Err("End date must not be before start date");
    }
    Ok(())
}

/// Validate a plan id sent to complete a subscription
pub fn validate_plan(plan_id: &str) -> Result<Plan, &'static str> {
    Plan::from_id(plan_id).ok_or("Unknown plan; expected 'monthly' or 'yearly'")
}

// ============================================================================
// General Validations
// ============================================================================

/// Required free text (names, descriptions, purposes)
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("This field is required");
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if validator::validate_email(email.trim()) {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate an Indian phone number
/// Accepts: 9876543210, 098765 43210, +91 98765-43210
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let local = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('0') => &digits[1..],
        12 if digits.starts_with("91") => &digits[2..],
        _ => return Err("Phone number must have 10 digits"),
    };

    if !local.starts_with(['6', '7', '8', '9']) {
        return Err("Mobile numbers start with 6, 7, 8 or 9");
    }
    Ok(())
}

/// Validate an optional phone number; blank counts as absent
pub fn validate_optional_phone(phone: Option<&str>) -> Result<(), &'static str> {
    match phone.map(str::trim) {
        Some(p) if !p.is_empty() => validate_phone(p),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Ledger Validation Tests
    // ========================================================================

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount(Decimal::new(1, 2)).is_ok());
        assert!(validate_positive_amount(Decimal::ZERO).is_err());
        assert!(validate_positive_amount(Decimal::from(-10)).is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(validate_non_negative(Decimal::ZERO).is_ok());
        assert!(validate_non_negative(Decimal::from(12)).is_ok());
        assert!(validate_non_negative(Decimal::new(-1, 1)).is_err());
    }

    #[test]
    fn test_amounts_above_ceiling_rejected() {
        let lakh_crore = Decimal::from(1_000_000_000_000i64);
        assert_eq!(MAX_LEDGER_AMOUNT, lakh_crore);
        assert!(validate_positive_amount(lakh_crore).is_ok());
        assert_eq!(validate_positive_amount(lakh_crore + Decimal::ONE), Err("Amount is too large"));
        assert_eq!(validate_non_negative(Decimal::MAX), Err("Amount is too large"));
        assert_eq!(validate_amount_received(Decimal::MAX), Err("Amount is too large"));
    }

    #[test]
    fn test_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
    }

    #[test]
    fn test_amount_received() {
        assert!(validate_amount_received(Decimal::from(5000)).is_ok());
        assert_eq!(
            validate_amount_received(Decimal::from(-1)),
            Err("Amount received cannot be negative")
        );
    }

    #[test]
    fn test_date_range() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(validate_date_range(jan, feb).is_ok());
        assert!(validate_date_range(jan, jan).is_ok());
        assert!(validate_date_range(feb, jan).is_err());
    }

    #[test]
    fn test_plan() {
        assert_eq!(validate_plan("monthly"), Ok(Plan::Monthly));
        assert_eq!(validate_plan("yearly"), Ok(Plan::Yearly));
        assert!(validate_plan("weekly").is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_required() {
        assert!(validate_required("Fly ash").is_ok());
        assert!(validate_required("   ").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("owner@brickworks.in").is_ok());
        assert!(validate_email("owner@").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_password() {
        assert!(validate_password("kiln-fire-42").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_phone_formats() {
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("09876543210").is_ok());
        assert!(validate_phone("+91 98765-43210").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("1234567890").is_err());
    }

    #[test]
    fn test_optional_phone() {
        assert!(validate_optional_phone(None).is_ok());
        assert!(validate_optional_phone(Some("")).is_ok());
        assert!(validate_optional_phone(Some("55")).is_err());
    }
}
