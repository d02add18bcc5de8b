//! WebAssembly module for BrickWorks Manager
//!
//! Provides client-side computation for:
//! - Stock previews before a purchase or usage is saved
//! - Customer payment allocation previews
//! - Rupee formatting
//! - Subscription countdown and input validation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::ledger::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str("brickworks wasm ready"));
}

#[derive(Deserialize)]
struct PurchaseLine {
    quantity: Decimal,
    unit_cost: Decimal,
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal, JsValue> {
    Decimal::from_str(value.trim())
        .map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", field, e)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn now() -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(js_sys::Date::now() as i64)
}

/// Stock position from purchase lines `[{quantity, unit_cost}]` and usage quantities
#[wasm_bindgen]
pub fn preview_stock(purchases_json: &str, usages_json: &str) -> Result<String, JsValue> {
    let purchases: Vec<PurchaseLine> = serde_json::from_str(purchases_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid purchases JSON: {}", e)))?;
    let usages: Vec<Decimal> = serde_json::from_str(usages_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid usages JSON: {}", e)))?;

    let position = StockPosition::from_movements(
        purchases.into_iter().map(|p| (p.quantity, p.unit_cost)),
        usages,
    )
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&position)
}

/// Show how a payment would be spread over a customer's open invoices
#[wasm_bindgen]
pub fn preview_payment_allocation(invoices_json: &str, amount: &str) -> Result<String, JsValue> {
    let invoices: Vec<OpenInvoice> = serde_json::from_str(invoices_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid invoices JSON: {}", e)))?;
    let amount = parse_decimal(amount, "amount")?;

    let allocation = allocate_payment(&invoices, amount, None)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    to_json(&allocation)
}

/// Sale total for a quantity at a per-unit rate
#[wasm_bindgen]
pub fn sale_total(quantity_sold: i32, rate_per_unit: &str) -> Result<String, JsValue> {
    validate_quantity(quantity_sold).map_err(JsValue::from_str)?;
    let rate = parse_decimal(rate_per_unit, "rate")?;
    let total = Sale::compute_total(quantity_sold, rate)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(total.to_string())
}

/// Format an amount as rupees, e.g. `₹12,34,567`; unparseable input shows `₹0`
#[wasm_bindgen]
pub fn format_rupees(amount: &str) -> String {
    match Decimal::from_str(amount.trim()) {
        Ok(value) => shared::format::format_inr(value),
        Err(_) => {
            web_sys::console::warn_1(&JsValue::from_str(&format!("not an amount: {}", amount)));
            shared::format::format_inr(Decimal::ZERO)
        }
    }
}

/// Evaluate a factory's subscription against the browser clock
#[wasm_bindgen]
pub fn subscription_status(factory_json: &str) -> Result<String, JsValue> {
    let factory: Factory = serde_json::from_str(factory_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid factory JSON: {}", e)))?;
    let now = now().ok_or_else(|| JsValue::from_str("Clock out of range"))?;

    to_json(&SubscriptionStatus::evaluate(&factory, now))
}

/// Check an Indian mobile number before submitting a form
#[wasm_bindgen]
pub fn is_valid_phone(phone: &str) -> bool {
    validate_phone(phone).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_total() {
        assert_eq!(sale_total(4000, "7.5").unwrap(), "30000.0");
    }

    #[test]
    fn test_format_rupees() {
        assert_eq!(format_rupees("1234567"), "₹12,34,567");
        assert_eq!(format_rupees("-1234"), "-₹1,234");
    }

    #[test]
    fn test_is_valid_phone() {
        assert!(is_valid_phone("+91 98765-43210"));
        assert!(!is_valid_phone("12345"));
    }

    #[test]
    fn test_preview_stock() {
        let json = preview_stock(
            r#"[{"quantity":"100","unit_cost":"10"},{"quantity":"50","unit_cost":"16"}]"#,
            r#"["30"]"#,
        )
        .unwrap();
        let position: StockPosition = serde_json::from_str(&json).unwrap();
        assert_eq!(position.quantity, Decimal::from(120));
        assert_eq!(position.average_cost, Decimal::from(12));
    }
}
