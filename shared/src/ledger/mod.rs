//! Ledger reconciliation
//!
//! Pure computations over rows already loaded from storage:
//! - [`stock`]: quantity on hand and weighted average cost of a material
//! - [`fifo`]: spreading a customer payment over open invoices, oldest first
//! - [`statement`]: customer summaries and running-balance statements
//! - [`report`]: period profit and loss
//!
//! None of these keep state between calls; callers re-read storage, compute,
//! then write the results back.

pub mod fifo;
pub mod report;
pub mod statement;
pub mod stock;

pub use fifo::*;
pub use report::*;
pub use statement::*;
pub use stock::*;

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by ledger computations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("payment amount must be positive, got {0}")]
    NonPositivePayment(Decimal),

    #[error("amount is too large to compute")]
    Overflow,
}

pub(crate) fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_sub(b).ok_or(LedgerError::Overflow)
}

pub(crate) fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal, LedgerError> {
    a.checked_mul(b).ok_or(LedgerError::Overflow)
}

/// Sum that reports overflow instead of panicking
pub(crate) fn checked_sum<I>(values: I) -> Result<Decimal, LedgerError>
where
    I: IntoIterator<Item = Decimal>,
{
    values.into_iter().try_fold(Decimal::ZERO, checked_add)
}
